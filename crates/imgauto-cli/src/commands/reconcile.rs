//! `imgauto reconcile` command - Run one automation against an objects file.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use imgauto_core::{
    Action, Condition, ConditionStatus, ControllerConfig, MemoryStore, ObjectKey, ObjectStore,
    Objects, Observer, Reconciler, Severity,
};

use crate::mutator::CliMutator;
use crate::output;

/// Prints engine events as they happen.
struct ConsoleObserver;

impl Observer for ConsoleObserver {
    fn event(&self, _key: &ObjectKey, severity: Severity, message: &str) {
        match severity {
            Severity::Info => output::info(message),
            Severity::Error => output::warn(message),
        }
    }
}

/// Run the reconcile command.
pub fn run(
    automation: &str,
    objects_path: &Path,
    config_path: Option<&Path>,
    mutator: Option<&str>,
    mutator_timeout: Duration,
) -> Result<()> {
    let key: ObjectKey = automation.parse()?;
    let config = match config_path {
        Some(path) => ControllerConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ControllerConfig::default(),
    };
    let objects = Objects::load(objects_path)
        .with_context(|| format!("Failed to read objects from {}", objects_path.display()))?;
    let mutator = CliMutator::from_command_line(mutator, mutator_timeout)?;

    let reconciler = Reconciler::new(
        MemoryStore::from_objects(objects),
        mutator,
        ConsoleObserver,
        config,
    );

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(reconciler.reconcile(&key));

    // status is written back whether or not the run succeeded
    reconciler
        .store()
        .objects()
        .save(objects_path)
        .with_context(|| format!("Failed to write objects to {}", objects_path.display()))?;

    let action = result.with_context(|| format!("Reconciliation of {key} failed"))?;
    let automation = rt.block_on(reconciler.store().get_automation(&key))?;
    report(&key, automation.as_ref().and_then(|a| a.status.ready()), action);
    Ok(())
}

fn report(key: &ObjectKey, ready: Option<&Condition>, action: Action) {
    match ready {
        Some(ready) => {
            let line = format!(
                "{} {key}: {} ({})",
                output::readiness_indicator(ready.status),
                ready.message,
                ready.reason
            );
            if ready.status == ConditionStatus::True {
                output::success(&line);
            } else {
                output::warn(&line);
            }
        }
        None => output::info(&format!("{key}: nothing to do")),
    }
    output::info(&output::next_run(action));
}
