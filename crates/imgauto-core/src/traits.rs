//! Trait abstractions for the controller's collaborators.
//!
//! The engine reads and writes objects through [`ObjectStore`], reads
//! credentials through [`SecretStore`], delegates manifest changes to a
//! [`Mutator`] and reports what happened to an [`Observer`]. Tests and the
//! CLI plug in [`MemoryStore`](crate::MemoryStore) and local mutators.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use crate::Result;
use crate::automation::{AutomationStatus, Condition, ImageUpdateAutomation};
use crate::object::ObjectKey;
use crate::source::{GitRepository, ImagePolicy, Secret};
use crate::update::UpdateResult;

/// Object storage the engine reads and writes.
pub trait ObjectStore: Send + Sync {
    /// Get an automation. `None` if it does not exist.
    fn get_automation(
        &self,
        key: &ObjectKey,
    ) -> impl Future<Output = Result<Option<ImageUpdateAutomation>>> + Send;

    /// List automations in a namespace.
    fn list_automations(
        &self,
        namespace: &str,
    ) -> impl Future<Output = Result<Vec<ImageUpdateAutomation>>> + Send;

    /// Replace the status of `base` with `status`.
    ///
    /// Fails with [`Error::Conflict`](crate::Error::Conflict) if the stored
    /// object has moved past `base.metadata.resource_version`.
    fn patch_automation_status(
        &self,
        base: &ImageUpdateAutomation,
        status: &AutomationStatus,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Get a git repository. `None` if it does not exist.
    fn get_git_repository(
        &self,
        key: &ObjectKey,
    ) -> impl Future<Output = Result<Option<GitRepository>>> + Send;

    /// List image policies in a namespace.
    fn list_image_policies(
        &self,
        namespace: &str,
    ) -> impl Future<Output = Result<Vec<ImagePolicy>>> + Send;
}

/// Secret storage.
pub trait SecretStore: Send + Sync {
    /// Get a secret. `None` if it does not exist.
    fn get_secret(&self, key: &ObjectKey) -> impl Future<Output = Result<Option<Secret>>> + Send;
}

/// Applies image policies to manifests in a working copy.
pub trait Mutator: Send + Sync {
    /// Rewrite files under `root` so they refer to the images the policies
    /// select, and report what changed.
    fn apply_setters(
        &self,
        root: &Path,
        policies: &[ImagePolicy],
    ) -> impl Future<Output = Result<UpdateResult>> + Send;
}

/// Event severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// Receives events and telemetry from the engine.
///
/// Every method defaults to doing nothing.
#[allow(unused_variables)]
pub trait Observer: Send + Sync {
    /// A human-readable event about an automation.
    fn event(&self, key: &ObjectKey, severity: Severity, message: &str) {}

    /// A run for `key` has begun.
    fn run_started(&self, key: &ObjectKey) {}

    /// Whether the automation is suspended, recorded on every run.
    fn record_suspend(&self, key: &ObjectKey, suspended: bool) {}

    /// The readiness condition as the run left it.
    fn record_readiness(&self, key: &ObjectKey, ready: Option<&Condition>, deleting: bool) {}

    /// How long the run took.
    fn record_duration(&self, key: &ObjectKey, elapsed: Duration) {}

    /// A commit was pushed.
    fn commit_pushed(&self, key: &ObjectKey, revision: &str, branch: &str) {}
}

/// Observer that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}
