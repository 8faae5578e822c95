use crate::config::ConfigGroup;

use super::merge_groups;

/// How the merged `current_context` is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CurrentContextPolicy {
    /// Take the last registered group's value, even when it is empty.
    #[default]
    LastSource,
    /// Take the last authoritative group's value when it is non-empty,
    /// otherwise fall back to [`LastSource`](Self::LastSource).
    Authoritative,
}

impl CurrentContextPolicy {
    fn resolve(self, groups: &[ConfigGroup]) -> String {
        let last_source = || {
            groups
                .last()
                .map(|group| group.current_context.clone())
                .unwrap_or_default()
        };

        match self {
            CurrentContextPolicy::LastSource => last_source(),
            CurrentContextPolicy::Authoritative => groups
                .iter()
                .rev()
                .find(|group| !group.can_be_deleted)
                .map(|group| group.current_context.clone())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(last_source),
        }
    }
}

/// An ordered set of groups to merge.
///
/// Groups are merged in registration order. Entries of an authoritative
/// group can never be replaced by a group registered after it; entries of a
/// plain source group are replaced by any later group defining the same name.
///
/// ## Example
///
/// ```
/// use kubeconfig_merge::{ConfigGroup, CurrentContextPolicy, MergePlan};
///
/// let team = ConfigGroup::new("team.yaml");
/// let target = ConfigGroup::new("~/.kube/config");
///
/// let merged = MergePlan::new()
///     .with_source(team)
///     .with_authoritative(target)
///     .current_context(CurrentContextPolicy::Authoritative)
///     .merge();
/// assert!(merged.is_empty());
/// ```
#[derive(Debug, Default)]
#[must_use = "merge plans do nothing until .merge() is called"]
pub struct MergePlan {
    groups: Vec<ConfigGroup>,
    policy: CurrentContextPolicy,
}

impl MergePlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a group keeping its own `can_be_deleted` flag.
    pub fn with_group(mut self, group: ConfigGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Registers a group whose entries later groups may replace.
    pub fn with_source(self, mut group: ConfigGroup) -> Self {
        group.can_be_deleted = true;
        self.with_group(group)
    }

    /// Registers a group whose entries are protected from later groups.
    pub fn with_authoritative(self, mut group: ConfigGroup) -> Self {
        group.can_be_deleted = false;
        self.with_group(group)
    }

    pub fn current_context(mut self, policy: CurrentContextPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Registered groups, in merge order.
    pub fn groups(&self) -> &[ConfigGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Merges the registered groups and selects the current context.
    pub fn merge(&self) -> ConfigGroup {
        let mut merged = merge_groups(&self.groups);
        merged.current_context = self.policy.resolve(&self.groups);
        merged
    }

    /// Consumes the plan, returning the merged group and the groups it was
    /// built from.
    pub fn into_parts(self) -> (ConfigGroup, Vec<ConfigGroup>) {
        let merged = self.merge();
        (merged, self.groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigNode, EntityKind};
    use serde_yaml::Value;

    fn group(source: &str, current_context: &str, contexts: &[(&str, &str)]) -> ConfigGroup {
        let mut group = ConfigGroup::new(source);
        group.current_context = current_context.to_string();
        for (name, cluster) in contexts {
            group.contexts.push(ConfigNode::new(*name, Value::from(*cluster)));
        }
        group
    }

    #[test]
    fn test_registration_sets_mutability() {
        let plan = MergePlan::new()
            .with_source(group("a", "", &[]))
            .with_authoritative(group("b", "", &[]));

        assert!(plan.groups()[0].can_be_deleted);
        assert!(!plan.groups()[1].can_be_deleted);
    }

    #[test]
    fn test_with_group_keeps_flag() {
        let mut replaceable = group("a", "", &[]);
        replaceable.can_be_deleted = true;

        let plan = MergePlan::new().with_group(replaceable);

        assert!(plan.groups()[0].can_be_deleted);
    }

    #[test]
    fn test_later_sources_override_earlier_sources() {
        let merged = MergePlan::new()
            .with_source(group("a", "", &[("dev", "from-a")]))
            .with_source(group("b", "", &[("dev", "from-b")]))
            .merge();

        let dev = merged.node(EntityKind::Context, "dev").unwrap();
        assert_eq!(dev.parameters, Value::from("from-b"));
    }

    #[test]
    fn test_authoritative_registered_first_is_protected() {
        let merged = MergePlan::new()
            .with_authoritative(group("target", "", &[("dev", "target")]))
            .with_source(group("b", "", &[("dev", "from-b")]))
            .merge();

        let dev = merged.node(EntityKind::Context, "dev").unwrap();
        assert_eq!(dev.parameters, Value::from("target"));
    }

    #[test]
    fn test_current_context_from_last_source() {
        let merged = MergePlan::new()
            .with_authoritative(group("target", "prod", &[]))
            .with_source(group("b", "", &[]))
            .merge();

        assert_eq!(merged.current_context, "");
    }

    #[test]
    fn test_current_context_from_authoritative() {
        let merged = MergePlan::new()
            .with_authoritative(group("target", "prod", &[]))
            .with_source(group("b", "dev", &[]))
            .current_context(CurrentContextPolicy::Authoritative)
            .merge();

        assert_eq!(merged.current_context, "prod");
    }

    #[test]
    fn test_authoritative_policy_falls_back_when_empty() {
        let merged = MergePlan::new()
            .with_source(group("a", "staging", &[]))
            .with_authoritative(group("target", "", &[]))
            .with_source(group("b", "dev", &[]))
            .current_context(CurrentContextPolicy::Authoritative)
            .merge();

        assert_eq!(merged.current_context, "dev");
    }

    #[test]
    fn test_empty_plan() {
        let plan = MergePlan::new();
        let merged = plan.merge();

        assert!(plan.is_empty());
        assert!(merged.is_empty());
        assert_eq!(merged.current_context, "");
    }

    #[test]
    fn test_into_parts_returns_groups() {
        let (merged, groups) = MergePlan::new()
            .with_source(group("a", "dev", &[("dev", "a")]))
            .into_parts();

        assert_eq!(merged.current_context, "dev");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].source, "a");
    }
}
