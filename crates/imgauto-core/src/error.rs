//! Error types for imgauto-core.

use crate::object::ObjectKey;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in imgauto-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The automation references a source kind other than `GitRepository`.
    #[error("source kind {0:?} not supported")]
    UnsupportedSourceKind(String),

    /// A `GitRepository` source was given without `.spec.git`.
    #[error("source kind GitRepository necessitates field .spec.git")]
    MissingGitSpec,

    /// Neither the push spec nor the checkout reference names a branch.
    #[error(
        "push branch not given explicitly, and cannot be inferred from .spec.git.checkout.ref or GitRepository .spec.ref"
    )]
    PushBranchUnresolved,

    /// The referenced auth secret could not be fetched.
    #[error("auth secret error: {0}")]
    AuthSecret(String),

    /// The auth secret does not hold usable credentials.
    #[error("auth error: {0}")]
    Auth(String),

    /// The signing key secret does not exist.
    #[error("could not find signing key secret '{0}'")]
    SigningSecretNotFound(ObjectKey),

    /// The signing key secret lacks the key ring field.
    #[error("signing key secret '{secret}' does not contain a '{field}' key")]
    SigningKeyMissing {
        /// The secret that was read.
        secret: ObjectKey,
        /// The missing data field.
        field: String,
    },

    /// The key ring could not be parsed.
    #[error("could not read signing key from secret '{secret}': {source}")]
    SigningKeyUnreadable {
        /// The secret that was read.
        secret: ObjectKey,
        /// Parse failure.
        source: imgauto_git::Error,
    },

    /// The key ring holds no secret key.
    #[error("no signing key found in secret '{0}'")]
    NoSigningIdentity(ObjectKey),

    /// The key ring holds more than one secret key.
    #[error(
        "multiple entities read from secret '{0}', could not determine which signing key to use"
    )]
    MultipleSigningIdentities(ObjectKey),

    /// The commit message template could not be parsed or rendered.
    #[error("{0}")]
    Template(String),

    /// The external mutation step failed.
    #[error("update failed: {0}")]
    Mutation(String),

    /// An object key could not be parsed.
    #[error("invalid object key {0:?}: expected <namespace>/<name>")]
    InvalidKey(String),

    /// An object vanished between reads.
    #[error("{0} not found")]
    NotFound(ObjectKey),

    /// A status patch was based on a stale copy of the object.
    #[error("conflict patching status of {0}: the object has been modified")]
    Conflict(ObjectKey),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Git operation error.
    #[error(transparent)]
    Git(#[from] imgauto_git::Error),
}
