use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::config::{ConfigGroup, ConfigNode, EntityKind};

/// On-disk shape of a kubeconfig document.
#[derive(Debug, Serialize)]
struct Document<'a> {
    #[serde(rename = "apiVersion")]
    api_version: &'static str,
    kind: &'static str,
    #[serde(rename = "current-context", skip_serializing_if = "Option::is_none")]
    current_context: Option<&'a str>,
    clusters: Vec<Mapping>,
    contexts: Vec<Mapping>,
    users: Vec<Mapping>,
}

/// Serializes a group back into kubeconfig YAML.
///
/// `current-context` is only written when the group has one.
pub fn encode(group: &ConfigGroup) -> Result<String, serde_yaml::Error> {
    let document = Document {
        api_version: "v1",
        kind: "Config",
        current_context: Some(group.current_context.as_str()).filter(|name| !name.is_empty()),
        clusters: entries(EntityKind::Cluster, &group.clusters),
        contexts: entries(EntityKind::Context, &group.contexts),
        users: entries(EntityKind::User, &group.users),
    };

    serde_yaml::to_string(&document)
}

fn entries(kind: EntityKind, nodes: &[ConfigNode]) -> Vec<Mapping> {
    nodes
        .iter()
        .map(|node| {
            let mut entry = Mapping::new();
            entry.insert(Value::from("name"), Value::from(node.name.as_str()));
            entry.insert(Value::from(kind.body_key()), node.parameters.clone());
            entry
        })
        .collect()
}
