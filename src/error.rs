use std::path::PathBuf;

use crate::config::ExtractError;
use thiserror::Error;

/// Errors that abort a whole merge run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("no files to merge: no existing file found in the given directories or file list")]
    NoSources,

    #[error("no valid config documents found to merge")]
    NoValidSources,

    #[error("failed to read target file '{path}': {source}")]
    ReadTarget {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("refusing to overwrite target: {0}")]
    MalformedTarget(#[source] ExtractError),

    #[error("failed to encode merged config: {0}")]
    Encode(#[from] serde_yaml::Error),

    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write target file '{path}': {source}")]
    WriteTarget {
        path: PathBuf,
        source: std::io::Error,
    },
}
