//! Objects the controller reads but never writes.

use std::collections::BTreeMap;

use imgauto_git::CheckoutRef;
use serde::{Deserialize, Serialize};

use crate::object::{LocalObjectReference, ObjectMeta};
use crate::serde_util;

/// A git repository the automation commits to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRepository {
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Desired state.
    pub spec: GitRepositorySpec,
}

/// Where the repository lives and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRepositorySpec {
    /// Clone URL.
    pub url: String,

    /// Reference checked out when the automation gives none.
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<GitRepositoryRef>,

    /// Secret holding credentials for `url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<LocalObjectReference>,

    /// Which git library performs network operations.
    #[serde(default = "default_git_implementation")]
    pub git_implementation: String,
}

fn default_git_implementation() -> String {
    imgauto_git::GitImplementation::default().as_str().to_string()
}

/// A branch, tag or commit to check out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRepositoryRef {
    /// Branch name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Tag name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Commit SHA.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

impl From<&GitRepositoryRef> for CheckoutRef {
    fn from(reference: &GitRepositoryRef) -> Self {
        Self {
            branch: reference.branch.clone(),
            tag: reference.tag.clone(),
            commit: reference.commit.clone(),
        }
    }
}

/// An image policy, resolved elsewhere to the latest acceptable image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePolicy {
    /// Object metadata.
    pub metadata: ObjectMeta,

    /// Latest image selected by the policy, e.g. `ghcr.io/org/app:1.2.3`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_image: Option<String>,
}

/// Opaque key/value byte payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    /// Object metadata.
    pub metadata: ObjectMeta,

    /// Data fields, base64 encoded when serialized.
    #[serde(default, with = "serde_util::base64_map")]
    pub data: BTreeMap<String, Vec<u8>>,
}

impl Secret {
    /// A data field as UTF-8 text, if present and valid.
    #[must_use]
    pub fn text(&self, field: &str) -> Option<&str> {
        self.data
            .get(field)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }
}
