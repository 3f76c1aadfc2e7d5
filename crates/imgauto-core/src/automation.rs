//! The image update automation object.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::object::{LocalObjectReference, ObjectMeta};
use crate::serde_util;
use crate::source::GitRepositoryRef;

/// Only source kind an automation may reference.
pub const GIT_REPOSITORY_KIND: &str = "GitRepository";

/// Type of the readiness condition.
pub const READY_CONDITION: &str = "Ready";

/// Automates committing image updates to a git repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUpdateAutomation {
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Desired state.
    pub spec: AutomationSpec,
    /// Observed state, written by the controller.
    #[serde(default)]
    pub status: AutomationStatus,
}

/// Desired state of an automation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationSpec {
    /// Repository the automation commits to.
    pub source_ref: SourceReference,

    /// How to check out, commit and push.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitSpec>,

    /// Time between runs.
    #[serde(with = "serde_util::duration")]
    pub interval: Duration,

    /// How to mutate the working copy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<UpdateSpec>,

    /// Skip runs while set.
    #[serde(default)]
    pub suspend: bool,
}

/// Kind and name of the source object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReference {
    /// Object kind; only `GitRepository` is supported.
    #[serde(default = "default_source_kind")]
    pub kind: String,
    /// Name in the automation's namespace.
    pub name: String,
}

fn default_source_kind() -> String {
    GIT_REPOSITORY_KIND.into()
}

/// Git settings of an automation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitSpec {
    /// Overrides the source's reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout: Option<GitCheckoutSpec>,

    /// Commit identity, message and signing.
    pub commit: CommitSpec,

    /// Branch to push to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<PushSpec>,
}

/// Reference to clone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitCheckoutSpec {
    /// Branch, tag or commit.
    #[serde(rename = "ref")]
    pub reference: GitRepositoryRef,
}

/// How commits are made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSpec {
    /// Commit author.
    pub author: CommitUser,

    /// Message template; the configured default when empty.
    #[serde(default)]
    pub message_template: String,

    /// OpenPGP key to sign commits with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_key: Option<SigningKeySpec>,
}

/// Name and email of a commit author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitUser {
    /// Name.
    pub name: String,
    /// Email.
    pub email: String,
}

/// Secret holding the signing key ring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningKeySpec {
    /// Secret in the automation's namespace.
    pub secret_ref: LocalObjectReference,
}

/// Push target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSpec {
    /// Branch to push to, created from the checkout if missing.
    pub branch: String,
}

/// Mutation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSpec {
    /// Update strategy.
    #[serde(default)]
    pub strategy: UpdateStrategy,

    /// Directory, relative to the repository root, to update under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Strategy used to update manifests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateStrategy {
    /// Apply setter markers found in YAML files.
    #[default]
    Setters,
    /// Anything this controller does not know.
    #[serde(other)]
    Unsupported,
}

/// Observed state of an automation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationStatus {
    /// When the last run finished, whether or not it pushed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_automation_run_time: Option<DateTime<Utc>>,

    /// Revision of the last pushed commit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_push_commit: Option<String>,

    /// When the last push happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_push_time: Option<DateTime<Utc>>,

    /// Conditions; currently only `Ready`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    /// Last reconcile-request annotation value acted on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_handled_reconcile_at: Option<String>,
}

impl AutomationStatus {
    /// The readiness condition, if one has been recorded.
    #[must_use]
    pub fn ready(&self) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.type_ == READY_CONDITION)
    }

    /// Replace the readiness condition.
    ///
    /// The transition time only moves when the status value changes.
    pub fn set_readiness(
        &mut self,
        status: ConditionStatus,
        reason: Reason,
        message: impl Into<String>,
        observed_generation: i64,
        now: DateTime<Utc>,
    ) {
        let message = message.into();
        if let Some(existing) = self
            .conditions
            .iter_mut()
            .find(|c| c.type_ == READY_CONDITION)
        {
            if existing.status != status {
                existing.last_transition_time = now;
            }
            existing.status = status;
            existing.reason = reason;
            existing.message = message;
            existing.observed_generation = observed_generation;
            return;
        }

        self.conditions.push(Condition {
            type_: READY_CONDITION.into(),
            status,
            reason,
            message,
            last_transition_time: now,
            observed_generation,
        });
    }

    /// Time elapsed since the last completed run.
    #[must_use]
    pub fn since_last_run(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.last_automation_run_time
            .and_then(|last| (now - last).to_std().ok())
    }
}

/// A condition on an object's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Condition type.
    #[serde(rename = "type")]
    pub type_: String,
    /// Status value.
    pub status: ConditionStatus,
    /// Machine-readable reason.
    pub reason: Reason,
    /// Human-readable detail.
    pub message: String,
    /// When `status` last changed.
    pub last_transition_time: DateTime<Utc>,
    /// Generation the condition was computed for.
    pub observed_generation: i64,
}

/// Tri-state condition value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

/// Reasons recorded on the readiness condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reason {
    /// The referenced source object does not exist.
    GitRepositoryNotAvailable,
    /// No update strategy the controller knows was given.
    NoUpdateStrategy,
    /// The run failed.
    ReconciliationFailed,
    /// The run completed.
    ReconciliationSucceeded,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::GitRepositoryNotAvailable => "GitRepositoryNotAvailable",
            Self::NoUpdateStrategy => "NoUpdateStrategy",
            Self::ReconciliationFailed => "ReconciliationFailed",
            Self::ReconciliationSucceeded => "ReconciliationSucceeded",
        };
        f.write_str(s)
    }
}
