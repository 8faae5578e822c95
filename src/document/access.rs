use serde_yaml::{Mapping, Sequence, Value};
use thiserror::Error;

/// A value in the document tree did not have the expected shape.
///
/// `at` is a dotted/indexed location such as `clusters[2].name`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected} at `{at}`, found {found}")]
pub struct ShapeError {
    pub at: String,
    pub expected: &'static str,
    pub found: &'static str,
}

impl ShapeError {
    pub fn new(at: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        Self {
            at: at.into(),
            expected,
            found,
        }
    }
}

/// Checked accessors over the untyped document tree.
pub trait ValueExt {
    /// Human-readable name of the value's variant, used in error messages.
    fn kind_name(&self) -> &'static str;

    fn try_mapping(&self, at: &str) -> Result<&Mapping, ShapeError>;

    fn try_sequence(&self, at: &str) -> Result<&Sequence, ShapeError>;

    fn try_str(&self, at: &str) -> Result<&str, ShapeError>;

    /// Like [`try_str`](Self::try_str), but an empty string is also rejected.
    fn try_non_empty_str(&self, at: &str) -> Result<&str, ShapeError> {
        match self.try_str(at)? {
            "" => Err(ShapeError::new(at, "non-empty string", "empty string")),
            s => Ok(s),
        }
    }
}

impl ValueExt for Value {
    fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
            Value::Tagged(_) => "tagged value",
        }
    }

    fn try_mapping(&self, at: &str) -> Result<&Mapping, ShapeError> {
        self.as_mapping()
            .ok_or_else(|| ShapeError::new(at, "mapping", self.kind_name()))
    }

    fn try_sequence(&self, at: &str) -> Result<&Sequence, ShapeError> {
        self.as_sequence()
            .ok_or_else(|| ShapeError::new(at, "sequence", self.kind_name()))
    }

    fn try_str(&self, at: &str) -> Result<&str, ShapeError> {
        self.as_str()
            .ok_or_else(|| ShapeError::new(at, "string", self.kind_name()))
    }
}

/// Looks up `key` in `map`, failing with a located error if it is absent.
pub fn required_field<'a>(map: &'a Mapping, key: &str, at: &str) -> Result<&'a Value, ShapeError> {
    let location = if at.is_empty() {
        key.to_string()
    } else {
        format!("{at}.{key}")
    };

    map.get(key)
        .ok_or_else(|| ShapeError::new(location, "a value", "nothing"))
}
