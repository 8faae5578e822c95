//! Validation and extraction of kubeconfig documents.

use serde_yaml::{Mapping, Value};

use super::{ConfigGroup, ConfigNode, EntityKind, ExtractError, SkipReason};
use crate::document::{decode, required_field, ShapeError, ValueExt};

/// Cheap textual pre-filter applied before a full decode.
const MARKER: &[u8] = b"apiVersion";

const API_VERSION: &str = "v1";
const KIND: &str = "Config";
const CURRENT_CONTEXT: &str = "current-context";

/// Parses a kubeconfig document into a [`ConfigGroup`].
///
/// Documents that are not mergeable kubeconfigs (no marker, bad syntax,
/// wrong `apiVersion`/`kind`, or an empty `clusters`/`contexts`/`users`
/// section) yield [`ExtractError::Skipped`]. A recognized document whose
/// entries are structurally broken yields [`ExtractError::Malformed`].
///
/// The returned group has `can_be_deleted == false`.
pub fn extract(bytes: &[u8], origin: &str) -> Result<ConfigGroup, ExtractError> {
    let skip = |reason| ExtractError::Skipped {
        origin: origin.to_string(),
        reason,
    };
    let malformed = |cause| ExtractError::Malformed {
        origin: origin.to_string(),
        cause,
    };

    if !contains_marker(bytes) {
        return Err(skip(SkipReason::MissingMarker));
    }

    let document = decode(bytes).map_err(|e| skip(SkipReason::InvalidSyntax(e.to_string())))?;

    let root = match document.as_mapping() {
        Some(root) if is_kubeconfig(root) => root,
        _ => return Err(skip(SkipReason::NotAConfig)),
    };

    let missing: Vec<&'static str> = EntityKind::ALL
        .into_iter()
        .filter(|&kind| section_is_empty(root, kind))
        .map(EntityKind::section)
        .collect();
    if !missing.is_empty() {
        return Err(skip(SkipReason::MissingSections(missing)));
    }

    let mut group = ConfigGroup::new(origin);
    group.current_context = current_context(root).map_err(malformed)?;
    for kind in EntityKind::ALL {
        *group.nodes_mut(kind) = extract_nodes(root, kind).map_err(malformed)?;
    }

    Ok(group)
}

fn contains_marker(bytes: &[u8]) -> bool {
    bytes.windows(MARKER.len()).any(|window| window == MARKER)
}

fn is_kubeconfig(root: &Mapping) -> bool {
    root.get("apiVersion").and_then(Value::as_str) == Some(API_VERSION)
        && root.get("kind").and_then(Value::as_str) == Some(KIND)
}

/// Absent, null and empty sections all count as missing. A section of the
/// wrong type is not "missing"; it is reported as malformed during extraction.
fn section_is_empty(root: &Mapping, kind: EntityKind) -> bool {
    match root.get(kind.section()) {
        None | Some(Value::Null) => true,
        Some(Value::Sequence(entries)) => entries.is_empty(),
        Some(_) => false,
    }
}

fn current_context(root: &Mapping) -> Result<String, ShapeError> {
    match root.get(CURRENT_CONTEXT) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(value) => value.try_str(CURRENT_CONTEXT).map(str::to_string),
    }
}

fn extract_nodes(root: &Mapping, kind: EntityKind) -> Result<Vec<ConfigNode>, ShapeError> {
    let section = kind.section();
    let entries = required_field(root, section, "")?.try_sequence(section)?;

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let at = format!("{section}[{index}]");
            let entry = entry.try_mapping(&at)?;

            let name = required_field(entry, "name", &at)?.try_non_empty_str(&format!("{at}.name"))?;

            let body_at = format!("{at}.{}", kind.body_key());
            let parameters = required_field(entry, kind.body_key(), &at)?;
            parameters.try_mapping(&body_at)?;

            Ok(ConfigNode::new(name, parameters.clone()))
        })
        .collect()
}
