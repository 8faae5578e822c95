//! Merge kubeconfig fragments into a single target file.
//!
//! Each source document is extracted into a [`ConfigGroup`]; groups are
//! merged per entity kind by name, where entries from the authoritative
//! target can never be replaced by less trusted sources.

pub mod config;
pub mod discover;
pub mod document;
mod error;
pub mod merge;
pub mod run;

pub use config::{extract, ConfigGroup, ConfigNode, EntityKind, ExtractError, SkipReason};
pub use error::Error;
pub use merge::{merge_groups, CurrentContextPolicy, MergePlan};
pub use run::{run, MergeOptions, Report};
