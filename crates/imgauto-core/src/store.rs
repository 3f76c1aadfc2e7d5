//! In-memory object store.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::automation::{AutomationStatus, ImageUpdateAutomation};
use crate::error::{Error, Result};
use crate::object::ObjectKey;
use crate::source::{GitRepository, ImagePolicy, Secret};
use crate::traits::{ObjectStore, SecretStore};

/// Every object the controller deals with, as written to an objects file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objects {
    /// Automations.
    #[serde(default)]
    pub automations: Vec<ImageUpdateAutomation>,
    /// Git repositories.
    #[serde(default)]
    pub git_repositories: Vec<GitRepository>,
    /// Image policies.
    #[serde(default)]
    pub image_policies: Vec<ImagePolicy>,
    /// Secrets.
    #[serde(default)]
    pub secrets: Vec<Secret>,
}

impl Objects {
    /// Load objects from a JSON file.
    ///
    /// # Errors
    /// Returns error if the file can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save objects to a JSON file.
    ///
    /// # Errors
    /// Returns error if serialization or write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        fs::write(path, content)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Inner {
    automations: BTreeMap<ObjectKey, ImageUpdateAutomation>,
    git_repositories: BTreeMap<ObjectKey, GitRepository>,
    image_policies: BTreeMap<ObjectKey, ImagePolicy>,
    secrets: BTreeMap<ObjectKey, Secret>,
}

/// Object and secret store kept in memory.
///
/// Every write bumps the object's resource version, and status patches
/// based on an older version are rejected.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `objects`.
    #[must_use]
    pub fn from_objects(objects: Objects) -> Self {
        let store = Self::new();
        for automation in objects.automations {
            store.put_automation(automation);
        }
        for repository in objects.git_repositories {
            store.put_git_repository(repository);
        }
        for policy in objects.image_policies {
            store.put_image_policy(policy);
        }
        for secret in objects.secrets {
            store.put_secret(secret);
        }
        store
    }

    /// Copy every stored object out.
    #[must_use]
    pub fn objects(&self) -> Objects {
        let inner = self.lock();
        Objects {
            automations: inner.automations.values().cloned().collect(),
            git_repositories: inner.git_repositories.values().cloned().collect(),
            image_policies: inner.image_policies.values().cloned().collect(),
            secrets: inner.secrets.values().cloned().collect(),
        }
    }

    /// Create or replace an automation, keeping its status if one is stored.
    ///
    /// The generation is bumped when the spec changes.
    pub fn put_automation(&self, mut automation: ImageUpdateAutomation) {
        let key = automation.metadata.key();
        let mut inner = self.lock();
        if let Some(existing) = inner.automations.get(&key) {
            automation.metadata.resource_version = existing.metadata.resource_version + 1;
            automation.metadata.generation = if existing.spec == automation.spec {
                existing.metadata.generation
            } else {
                existing.metadata.generation + 1
            };
            if automation.status == AutomationStatus::default() {
                automation.status = existing.status.clone();
            }
        } else {
            automation.metadata.resource_version = automation.metadata.resource_version.max(1);
            automation.metadata.generation = automation.metadata.generation.max(1);
        }
        inner.automations.insert(key, automation);
    }

    /// Create or replace a git repository.
    pub fn put_git_repository(&self, repository: GitRepository) {
        self.lock()
            .git_repositories
            .insert(repository.metadata.key(), repository);
    }

    /// Delete a git repository.
    pub fn remove_git_repository(&self, key: &ObjectKey) -> Option<GitRepository> {
        self.lock().git_repositories.remove(key)
    }

    /// Create or replace an image policy.
    pub fn put_image_policy(&self, policy: ImagePolicy) {
        self.lock()
            .image_policies
            .insert(policy.metadata.key(), policy);
    }

    /// Create or replace a secret.
    pub fn put_secret(&self, secret: Secret) {
        self.lock().secrets.insert(secret.metadata.key(), secret);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ObjectStore for MemoryStore {
    async fn get_automation(&self, key: &ObjectKey) -> Result<Option<ImageUpdateAutomation>> {
        Ok(self.lock().automations.get(key).cloned())
    }

    async fn list_automations(&self, namespace: &str) -> Result<Vec<ImageUpdateAutomation>> {
        Ok(self
            .lock()
            .automations
            .values()
            .filter(|a| a.metadata.namespace == namespace)
            .cloned()
            .collect())
    }

    async fn patch_automation_status(
        &self,
        base: &ImageUpdateAutomation,
        status: &AutomationStatus,
    ) -> Result<()> {
        let key = base.metadata.key();
        let mut inner = self.lock();
        let stored = inner
            .automations
            .get_mut(&key)
            .ok_or_else(|| Error::NotFound(key.clone()))?;
        if stored.metadata.resource_version != base.metadata.resource_version {
            return Err(Error::Conflict(key));
        }
        stored.status = status.clone();
        stored.metadata.resource_version += 1;
        Ok(())
    }

    async fn get_git_repository(&self, key: &ObjectKey) -> Result<Option<GitRepository>> {
        Ok(self.lock().git_repositories.get(key).cloned())
    }

    async fn list_image_policies(&self, namespace: &str) -> Result<Vec<ImagePolicy>> {
        Ok(self
            .lock()
            .image_policies
            .values()
            .filter(|p| p.metadata.namespace == namespace)
            .cloned()
            .collect())
    }
}

impl SecretStore for MemoryStore {
    async fn get_secret(&self, key: &ObjectKey) -> Result<Option<Secret>> {
        Ok(self.lock().secrets.get(key).cloned())
    }
}
