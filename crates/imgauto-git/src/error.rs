//! Error types for imgauto-git.

use std::time::Duration;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during git operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Not inside a git repository, or the repository is bare.
    #[error("not a git repository")]
    NotARepository,

    /// Branch not found.
    #[error("branch not found: {0}")]
    BranchNotFound(String),

    /// Reference not found.
    #[error("reference not found: {0}")]
    RefNotFound(String),

    /// Remote not found.
    #[error("remote not found: {0}")]
    RemoteNotFound(String),

    /// The git implementation selector names no known backend.
    #[error("unknown git implementation {0:?}")]
    UnknownImplementation(String),

    /// Clone failed.
    #[error("clone failed: {0}")]
    CloneFailed(String),

    /// Fetch failed.
    #[error("fetch failed: {0}")]
    FetchFailed(String),

    /// Push failed. The message has already been normalized.
    #[error("{0}")]
    PushFailed(String),

    /// A network operation did not finish before its deadline.
    #[error("{operation} timed out after {}s", timeout.as_secs())]
    Timeout {
        /// The operation that timed out.
        operation: &'static str,
        /// The deadline that elapsed.
        timeout: Duration,
    },

    /// Credentials could not be used.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Signing key could not be parsed or used.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The git executable exited unsuccessfully.
    #[error("git {command} failed: {stderr}")]
    Command {
        /// Subcommand that failed.
        command: String,
        /// Trimmed stderr of the process.
        stderr: String,
    },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying git2 error.
    #[error("git error: {0}")]
    Git2(#[from] git2::Error),
}
