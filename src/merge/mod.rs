//! Precedence-aware merging of config groups.

mod plan;

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::{ConfigGroup, ConfigNode, EntityKind};

pub use plan::{CurrentContextPolicy, MergePlan};

/// A node in the accumulating result together with the group that currently
/// owns it and that group's mutability.
#[derive(Debug, Clone, Copy)]
struct OwnedNode<'a> {
    node: &'a ConfigNode,
    group: usize,
    can_be_deleted: bool,
}

impl OwnedNode<'_> {
    /// Protected nodes only resist nodes from other groups; a later
    /// duplicate in the owning group still replaces them.
    fn blocks(&self, group: usize) -> bool {
        !self.can_be_deleted && self.group != group
    }
}

/// Merges groups in the given order.
///
/// For every entity kind, a node replaces an earlier node of the same name
/// unless that earlier node came from a different group with
/// `can_be_deleted == false`. Among replaceable nodes the last one wins.
/// Inside a single group the last duplicate always wins, protected or not.
///
/// The result has an empty `source` and `current_context`, is itself
/// replaceable (`can_be_deleted == true`), and lists nodes sorted by name.
pub fn merge_groups<'a, I>(groups: I) -> ConfigGroup
where
    I: IntoIterator<Item = &'a ConfigGroup>,
{
    let groups: Vec<&ConfigGroup> = groups.into_iter().collect();

    let mut merged = ConfigGroup {
        can_be_deleted: true,
        ..ConfigGroup::default()
    };
    for kind in EntityKind::ALL {
        *merged.nodes_mut(kind) = merge_kind(&groups, kind);
    }

    merged
}

fn merge_kind(groups: &[&ConfigGroup], kind: EntityKind) -> Vec<ConfigNode> {
    let mut owned: BTreeMap<&str, OwnedNode<'_>> = BTreeMap::new();

    for (index, group) in groups.iter().enumerate() {
        for node in group.nodes(kind) {
            if let Some(incumbent) = owned.get(node.name.as_str()) {
                if incumbent.blocks(index) {
                    debug!(
                        %kind,
                        name = %node.name,
                        source = %group.source,
                        "keeping protected entry"
                    );
                    continue;
                }
            }

            owned.insert(
                &node.name,
                OwnedNode {
                    node,
                    group: index,
                    can_be_deleted: group.can_be_deleted,
                },
            );
        }
    }

    owned.into_values().map(|owned| owned.node.clone()).collect()
}
