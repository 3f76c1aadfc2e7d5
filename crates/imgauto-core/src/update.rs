//! What the mutation step reports back.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Files, objects and images touched by one mutation.
///
/// Serialized field names are the ones commit message templates see.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateResult {
    /// Keyed by path relative to the manifests root.
    #[serde(default)]
    pub files: BTreeMap<String, FileResult>,
}

/// Objects updated within one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileResult {
    /// Object identifier (e.g. `Deployment/default/app`) to the images
    /// written into it.
    #[serde(default)]
    pub objects: BTreeMap<String, Vec<String>>,
}

impl UpdateResult {
    /// Every distinct image written, sorted.
    #[must_use]
    pub fn images(&self) -> Vec<String> {
        self.files
            .values()
            .flat_map(|file| file.objects.values())
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Whether nothing was reported as updated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.values().all(|file| file.objects.is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_images_are_deduplicated() {
        let result: UpdateResult = serde_json::from_str(
            r#"{"Files": {
                "a.yaml": {"Objects": {"Deployment/default/a": ["app:1.1", "sidecar:2"]}},
                "b.yaml": {"Objects": {"Deployment/default/b": ["app:1.1"]}}
            }}"#,
        )
        .unwrap();

        assert_eq!(result.images(), vec!["app:1.1", "sidecar:2"]);
        assert!(!result.is_empty());
    }

    #[test]
    fn test_empty_result() {
        assert!(UpdateResult::default().is_empty());
        assert!(UpdateResult::default().images().is_empty());
    }
}
