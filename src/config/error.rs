use thiserror::Error;

use crate::document::ShapeError;

/// Why a source document was left out of the merge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SkipReason {
    #[error("does not look like a config document (no `apiVersion` marker)")]
    MissingMarker,

    #[error("invalid document syntax: {0}")]
    InvalidSyntax(String),

    #[error("not a recognized config document (expected apiVersion `v1` and kind `Config`)")]
    NotAConfig,

    #[error("missing required sections: {}", .0.join(", "))]
    MissingSections(Vec<&'static str>),
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractError {
    /// The source is not a mergeable kubeconfig; it contributes nothing.
    #[error("skipping '{origin}': {reason}")]
    Skipped { origin: String, reason: SkipReason },

    /// The source is a kubeconfig but its entities are corrupt.
    #[error("malformed config document '{origin}': {cause}")]
    Malformed {
        origin: String,
        #[source]
        cause: ShapeError,
    },
}

impl ExtractError {
    pub fn is_skip(&self) -> bool {
        matches!(self, ExtractError::Skipped { .. })
    }
}
