//! Kubeconfig data model and extraction.

mod error;
mod parse;

use std::collections::BTreeSet;
use std::fmt;

use serde_yaml::Value;

pub use error::{ExtractError, SkipReason};
pub use parse::extract;

/// The three entity collections of a kubeconfig, merged independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Cluster,
    Context,
    User,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Cluster, EntityKind::Context, EntityKind::User];

    /// Top-level key holding the collection, e.g. `clusters`.
    pub fn section(self) -> &'static str {
        match self {
            EntityKind::Cluster => "clusters",
            EntityKind::Context => "contexts",
            EntityKind::User => "users",
        }
    }

    /// Per-entry key holding the entity body, e.g. `cluster`.
    pub fn body_key(self) -> &'static str {
        match self {
            EntityKind::Cluster => "cluster",
            EntityKind::Context => "context",
            EntityKind::User => "user",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.body_key())
    }
}

/// One named cluster, context or user.
///
/// `parameters` is carried through merging untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigNode {
    pub name: String,
    pub parameters: Value,
}

impl ConfigNode {
    pub fn new(name: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }
}

/// The parsed contents of one source document plus merge metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigGroup {
    pub clusters: Vec<ConfigNode>,
    pub contexts: Vec<ConfigNode>,
    pub users: Vec<ConfigNode>,

    /// Where the group came from; diagnostics only.
    pub source: String,

    /// Active context when the document was read. Empty means none.
    pub current_context: String,

    /// Whether a later group may replace entries owned by this one.
    ///
    /// Extraction leaves this `false`; the caller decides.
    pub can_be_deleted: bool,
}

impl ConfigGroup {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn nodes(&self, kind: EntityKind) -> &[ConfigNode] {
        match kind {
            EntityKind::Cluster => &self.clusters,
            EntityKind::Context => &self.contexts,
            EntityKind::User => &self.users,
        }
    }

    pub fn nodes_mut(&mut self, kind: EntityKind) -> &mut Vec<ConfigNode> {
        match kind {
            EntityKind::Cluster => &mut self.clusters,
            EntityKind::Context => &mut self.contexts,
            EntityKind::User => &mut self.users,
        }
    }

    /// Looks up a node by name. With duplicate names the last one wins,
    /// matching how merging treats them.
    pub fn node(&self, kind: EntityKind, name: &str) -> Option<&ConfigNode> {
        self.nodes(kind).iter().rev().find(|node| node.name == name)
    }

    /// Distinct entity names of one kind.
    pub fn names(&self, kind: EntityKind) -> BTreeSet<&str> {
        self.nodes(kind).iter().map(|node| node.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        EntityKind::ALL.iter().all(|&kind| self.nodes(kind).is_empty())
    }
}
