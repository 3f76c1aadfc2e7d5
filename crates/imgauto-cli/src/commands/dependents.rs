//! `imgauto dependents` command - Show which automations a change triggers.

use std::path::Path;

use anyhow::{Context, Result};
use imgauto_core::watch::{automations_for_git_repository, automations_for_image_policy};
use imgauto_core::{AutomationIndex, ObjectKey, ObjectMeta, Objects};

use crate::output;

/// Run the dependents command.
pub fn run(
    objects_path: &Path,
    git_repository: Option<&str>,
    image_policy: Option<&str>,
    json: bool,
) -> Result<()> {
    let objects = Objects::load(objects_path)
        .with_context(|| format!("Failed to read objects from {}", objects_path.display()))?;
    let index = AutomationIndex::from_automations(&objects.automations);

    let (kind, changed, keys) = match (git_repository, image_policy) {
        (Some(repository), _) => {
            let meta = meta(repository)?;
            let keys = automations_for_git_repository(&index, &meta);
            ("git repository", meta.key(), keys)
        }
        (None, Some(policy)) => {
            let meta = meta(policy)?;
            let keys = automations_for_image_policy(&index, &meta);
            ("image policy", meta.key(), keys)
        }
        (None, None) => anyhow::bail!("Pass --git-repository or --image-policy"),
    };

    if json {
        let names: Vec<String> = keys.iter().map(ToString::to_string).collect();
        output::essential(&serde_json::to_string_pretty(&names)?);
        return Ok(());
    }

    if keys.is_empty() {
        output::info(&format!("No automations depend on {kind} {changed}"));
        return Ok(());
    }
    for key in &keys {
        output::essential(&key.to_string());
    }
    Ok(())
}

fn meta(key: &str) -> Result<ObjectMeta> {
    let key: ObjectKey = key.parse()?;
    Ok(ObjectMeta::new(key.namespace, key.name))
}
