//! Configuration management for the controller.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::serde_util;

/// Controller configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Git transport settings.
    #[serde(default)]
    pub git: GitConfig,

    /// Commit settings.
    #[serde(default)]
    pub commit: CommitConfig,

    /// Reconciliation settings.
    #[serde(default)]
    pub reconcile: ReconcileConfig,
}

impl ControllerConfig {
    /// Load config from a TOML file.
    ///
    /// # Errors
    /// Returns error if file can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to a TOML file.
    ///
    /// # Errors
    /// Returns error if serialization or write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| std::io::Error::other(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Git transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Name of the remote every clone is set up with.
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Deadline for each clone, fetch or push.
    #[serde(default = "default_timeout", with = "serde_util::duration")]
    pub timeout: Duration,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            timeout: default_timeout(),
        }
    }
}

fn default_remote() -> String {
    "origin".into()
}

const fn default_timeout() -> Duration {
    Duration::from_secs(120)
}

/// Commit settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitConfig {
    /// Template used when an automation gives none.
    #[serde(default = "default_message_template")]
    pub default_message_template: String,

    /// Secret field holding the armored signing key ring.
    #[serde(default = "default_signing_key_field")]
    pub signing_key_field: String,

    /// Secret field holding the signing key passphrase, if any.
    #[serde(default = "default_signing_passphrase_field")]
    pub signing_passphrase_field: String,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            default_message_template: default_message_template(),
            signing_key_field: default_signing_key_field(),
            signing_passphrase_field: default_signing_passphrase_field(),
        }
    }
}

/// Commit message used when the automation does not specify a template.
pub const DEFAULT_MESSAGE_TEMPLATE: &str = "Update from image update automation";

fn default_message_template() -> String {
    DEFAULT_MESSAGE_TEMPLATE.into()
}

fn default_signing_key_field() -> String {
    "git.asc".into()
}

fn default_signing_passphrase_field() -> String {
    "passphrase".into()
}

/// Reconciliation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Lower bound on the requeue interval.
    #[serde(default = "default_min_interval", with = "serde_util::duration")]
    pub min_interval: Duration,

    /// Directory working copies are created in. System temp dir when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmp_dir: Option<PathBuf>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            min_interval: default_min_interval(),
            tmp_dir: None,
        }
    }
}

const fn default_min_interval() -> Duration {
    Duration::from_secs(1)
}
