//! # imgauto-core
//!
//! Core library for imgauto: the automation object model, the
//! reconciliation engine that clones, updates, commits and pushes, and the
//! watch mappers deciding which automations a change affects.

pub mod access;
pub mod automation;
pub mod config;
pub mod error;
pub mod message;
pub mod object;
pub mod paths;
pub mod reconcile;
pub(crate) mod serde_util;
pub mod signing;
pub mod source;
pub mod store;
pub mod traits;
pub mod update;
pub mod watch;

pub use automation::{
    AutomationSpec, AutomationStatus, CommitSpec, CommitUser, Condition, ConditionStatus,
    GitCheckoutSpec, GitSpec, ImageUpdateAutomation, PushSpec, Reason, SigningKeySpec,
    SourceReference, UpdateSpec, UpdateStrategy,
};
pub use config::ControllerConfig;
pub use error::{Error, Result};
pub use object::{LocalObjectReference, ObjectKey, ObjectMeta, RECONCILE_REQUEST_ANNOTATION};
pub use reconcile::{Action, Reconciler};
pub use source::{GitRepository, GitRepositoryRef, GitRepositorySpec, ImagePolicy, Secret};
pub use store::{MemoryStore, Objects};
pub use traits::{Mutator, NoopObserver, ObjectStore, Observer, SecretStore, Severity};
pub use update::{FileResult, UpdateResult};
pub use watch::AutomationIndex;
