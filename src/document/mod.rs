//! Generic YAML document handling.
//!
//! Sources are decoded into an untyped [`Value`] tree first; shape checks
//! happen afterwards through the fallible accessors in [`ValueExt`].

mod access;
mod encode;

pub use access::{required_field, ShapeError, ValueExt};
pub use encode::encode;
use serde::Deserialize;
pub use serde_yaml::{Mapping, Sequence, Value};

/// Decodes raw document bytes into a generic value tree.
///
/// Only the first YAML document of a stream is read; later documents
/// (including an empty one after a trailing `---`) are ignored.
pub fn decode(bytes: &[u8]) -> Result<Value, serde_yaml::Error> {
    match serde_yaml::Deserializer::from_slice(bytes).next() {
        Some(document) => Value::deserialize(document),
        None => Ok(Value::Null),
    }
}
