//! Map changes to related objects onto the automations they affect.

use std::collections::{BTreeMap, BTreeSet};

use crate::automation::ImageUpdateAutomation;
use crate::object::{ObjectKey, ObjectMeta};

/// Secondary index value of an automation: the name of its source.
#[must_use]
pub fn source_index_key(automation: &ImageUpdateAutomation) -> &str {
    &automation.spec.source_ref.name
}

/// Automations known to the controller, indexed by namespace and by the
/// source they reference.
#[derive(Debug, Clone, Default)]
pub struct AutomationIndex {
    by_namespace: BTreeMap<String, BTreeSet<String>>,
    by_source: BTreeMap<(String, String), BTreeSet<String>>,
    sources: BTreeMap<ObjectKey, String>,
}

impl AutomationIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index over `automations`.
    #[must_use]
    pub fn from_automations<'a>(
        automations: impl IntoIterator<Item = &'a ImageUpdateAutomation>,
    ) -> Self {
        let mut index = Self::new();
        for automation in automations {
            index.upsert(automation);
        }
        index
    }

    /// Add or refresh an automation.
    pub fn upsert(&mut self, automation: &ImageUpdateAutomation) {
        let key = automation.metadata.key();
        self.remove(&key);

        let source = source_index_key(automation).to_string();
        self.by_namespace
            .entry(key.namespace.clone())
            .or_default()
            .insert(key.name.clone());
        self.by_source
            .entry((key.namespace.clone(), source.clone()))
            .or_default()
            .insert(key.name.clone());
        self.sources.insert(key, source);
    }

    /// Forget an automation.
    pub fn remove(&mut self, key: &ObjectKey) {
        let Some(source) = self.sources.remove(key) else {
            return;
        };
        if let Some(names) = self.by_namespace.get_mut(&key.namespace) {
            names.remove(&key.name);
            if names.is_empty() {
                self.by_namespace.remove(&key.namespace);
            }
        }
        let source_key = (key.namespace.clone(), source);
        if let Some(names) = self.by_source.get_mut(&source_key) {
            names.remove(&key.name);
            if names.is_empty() {
                self.by_source.remove(&source_key);
            }
        }
    }

    /// Number of automations indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether no automations are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Automations to reconcile when the git repository `repository` changes:
/// those in its namespace referencing it by name.
#[must_use]
pub fn automations_for_git_repository(
    index: &AutomationIndex,
    repository: &ObjectMeta,
) -> Vec<ObjectKey> {
    index
        .by_source
        .get(&(repository.namespace.clone(), repository.name.clone()))
        .into_iter()
        .flatten()
        .map(|name| ObjectKey::new(&repository.namespace, name))
        .collect()
}

/// Automations to reconcile when the image policy `policy` changes: every
/// automation in its namespace.
#[must_use]
pub fn automations_for_image_policy(index: &AutomationIndex, policy: &ObjectMeta) -> Vec<ObjectKey> {
    index
        .by_namespace
        .get(&policy.namespace)
        .into_iter()
        .flatten()
        .map(|name| ObjectKey::new(&policy.namespace, name))
        .collect()
}

/// Whether an update from `old` to `new` calls for a reconciliation.
///
/// Status-only writes, including the controller's own, do not.
#[must_use]
pub fn should_reconcile(old: &ObjectMeta, new: &ObjectMeta) -> bool {
    old.generation != new.generation || old.reconcile_request() != new.reconcile_request()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::automation::{AutomationSpec, AutomationStatus, SourceReference};
    use crate::object::RECONCILE_REQUEST_ANNOTATION;

    fn automation(namespace: &str, name: &str, source: &str) -> ImageUpdateAutomation {
        ImageUpdateAutomation {
            metadata: ObjectMeta::new(namespace, name),
            spec: AutomationSpec {
                source_ref: SourceReference {
                    kind: "GitRepository".into(),
                    name: source.into(),
                },
                git: None,
                interval: Duration::from_secs(60),
                update: None,
                suspend: false,
            },
            status: AutomationStatus::default(),
        }
    }

    fn index() -> AutomationIndex {
        AutomationIndex::from_automations(&[
            automation("default", "a", "repo-1"),
            automation("default", "b", "repo-1"),
            automation("default", "c", "repo-2"),
            automation("other", "d", "repo-1"),
        ])
    }

    #[test]
    fn test_git_repository_maps_to_referencing_automations() {
        let keys = automations_for_git_repository(&index(), &ObjectMeta::new("default", "repo-1"));

        assert_eq!(
            keys,
            vec![ObjectKey::new("default", "a"), ObjectKey::new("default", "b")]
        );
    }

    #[test]
    fn test_unreferenced_repository_maps_to_nothing() {
        let keys = automations_for_git_repository(&index(), &ObjectMeta::new("default", "repo-3"));
        assert!(keys.is_empty());
    }

    #[test]
    fn test_image_policy_maps_to_whole_namespace() {
        let keys = automations_for_image_policy(&index(), &ObjectMeta::new("default", "app"));
        assert_eq!(keys.len(), 3);

        let keys = automations_for_image_policy(&index(), &ObjectMeta::new("empty", "app"));
        assert!(keys.is_empty());
    }

    #[test]
    fn test_upsert_moves_source() {
        let mut index = index();
        index.upsert(&automation("default", "a", "repo-2"));

        let repo_1 = automations_for_git_repository(&index, &ObjectMeta::new("default", "repo-1"));
        let repo_2 = automations_for_git_repository(&index, &ObjectMeta::new("default", "repo-2"));
        assert_eq!(repo_1, vec![ObjectKey::new("default", "b")]);
        assert_eq!(repo_2.len(), 2);
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_remove() {
        let mut index = index();
        index.remove(&ObjectKey::new("other", "d"));
        index.remove(&ObjectKey::new("other", "missing"));

        assert_eq!(index.len(), 3);
        assert!(automations_for_image_policy(&index, &ObjectMeta::new("other", "p")).is_empty());
    }

    #[test]
    fn test_should_reconcile() {
        let old = ObjectMeta::new("default", "a");

        let mut status_only = old.clone();
        status_only.resource_version += 1;
        assert!(!should_reconcile(&old, &status_only));

        let mut spec_change = old.clone();
        spec_change.generation += 1;
        assert!(should_reconcile(&old, &spec_change));

        let mut requested = old.clone();
        requested
            .annotations
            .insert(RECONCILE_REQUEST_ANNOTATION.into(), "2024-01-01T00:00:00Z".into());
        assert!(should_reconcile(&old, &requested));
    }
}
