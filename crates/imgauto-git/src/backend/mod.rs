//! Network git operations behind one interface, implemented twice.
//!
//! [`Libgit2Transport`] drives libgit2 through `git2`; [`CliTransport`]
//! drives the `git` executable. [`Backend`] selects one of them from a
//! [`GitImplementation`] and layers the shared behaviour on top: refspec
//! construction, deadlines, push error normalization and handing back the
//! canonical [`Repository`] view that commits are made against.
//!
//! # Cancellation
//!
//! The two transports do not honor deadlines equally. A `git` process is
//! killed when its deadline elapses. libgit2 calls run on the blocking pool
//! and cannot be interrupted: when the deadline elapses the caller stops
//! waiting and gets [`Error::Timeout`], but the call itself runs on until it
//! finishes or hits libgit2's own network timeouts.

mod cli;
mod libgit2;

use std::fmt;
use std::future::Future;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

pub use cli::CliTransport;
pub use libgit2::Libgit2Transport;

use crate::auth::RepoAccess;
use crate::error::{Error, Result};
use crate::normalize::normalize_push_error;
use crate::repository::Repository;

/// Selector naming which git library performs network operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GitImplementation {
    /// libgit2 through `git2`.
    #[default]
    Libgit2,
    /// The `git` executable.
    GitCli,
}

impl GitImplementation {
    /// Selector value as written on a source object.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Libgit2 => "libgit2",
            Self::GitCli => "git-cli",
        }
    }
}

impl fmt::Display for GitImplementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GitImplementation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "libgit2" => Ok(Self::Libgit2),
            "git-cli" => Ok(Self::GitCli),
            other => Err(Error::UnknownImplementation(other.to_string())),
        }
    }
}

/// What to check out after cloning.
///
/// A commit wins over a tag, which wins over a branch. With none set the
/// remote's default branch is checked out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutRef {
    /// Branch to clone.
    pub branch: Option<String>,
    /// Tag to check out (detached).
    pub tag: Option<String>,
    /// Commit SHA to check out (detached).
    pub commit: Option<String>,
}

/// Outcome of fetching a single branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The remote branch was fetched into the local branch of the same name.
    Fetched,
    /// The remote has no such branch.
    BranchMissing,
}

/// Refspec mapping a remote branch onto the local branch of the same name.
#[must_use]
pub fn branch_refspec(branch: &str) -> String {
    format!("refs/heads/{branch}:refs/heads/{branch}")
}

/// Network operations one git library performs.
///
/// Every method works on a working copy at a filesystem path so that
/// implementations never need to share an in-memory repository type.
pub trait Transport: Send + Sync {
    /// Clone `access.url` into the empty directory `path` and check out
    /// `reference`.
    fn clone_repository(
        &self,
        access: &RepoAccess,
        reference: Option<&CheckoutRef>,
        path: &Path,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Fetch `refs/heads/<branch>` into the local branch of the same name.
    fn fetch(
        &self,
        path: &Path,
        branch: &str,
        access: &RepoAccess,
    ) -> impl Future<Output = Result<FetchOutcome>> + Send;

    /// Push the local branch to the same-named remote branch.
    fn push(
        &self,
        path: &Path,
        branch: &str,
        access: &RepoAccess,
    ) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone)]
enum AnyTransport {
    Libgit2(Libgit2Transport),
    GitCli(CliTransport),
}

/// The git backend for one run.
#[derive(Debug, Clone)]
pub struct Backend {
    implementation: GitImplementation,
    transport: AnyTransport,
    timeout: Duration,
}

impl Backend {
    /// Create a backend using `implementation` against the remote named
    /// `remote`, bounding each network operation by `timeout`.
    #[must_use]
    pub fn new(implementation: GitImplementation, remote: &str, timeout: Duration) -> Self {
        let transport = match implementation {
            GitImplementation::Libgit2 => AnyTransport::Libgit2(Libgit2Transport::new(remote)),
            GitImplementation::GitCli => AnyTransport::GitCli(CliTransport::new(remote)),
        };
        Self {
            implementation,
            transport,
            timeout,
        }
    }

    /// Clone into `path` and open the result as the canonical repository.
    ///
    /// # Errors
    /// Returns error if the clone fails or times out.
    pub async fn clone_into(
        &self,
        access: &RepoAccess,
        reference: Option<&CheckoutRef>,
        path: &Path,
    ) -> Result<Repository> {
        let cloned = match &self.transport {
            AnyTransport::Libgit2(t) => self.deadline("clone", t.clone_repository(access, reference, path)).await,
            AnyTransport::GitCli(t) => self.deadline("clone", t.clone_repository(access, reference, path)).await,
        };
        cloned?;
        debug!(implementation = %self.implementation, path = %path.display(), "cloned repository");
        Repository::open(path)
    }

    /// Fetch `branch` from the remote into the local branch of the same name
    /// in the working copy at `path`.
    ///
    /// # Errors
    /// Returns error for any failure other than the branch being absent on
    /// the remote.
    pub async fn fetch_branch(
        &self,
        path: &Path,
        branch: &str,
        access: &RepoAccess,
    ) -> Result<FetchOutcome> {
        let outcome = match &self.transport {
            AnyTransport::Libgit2(t) => self.deadline("fetch", t.fetch(path, branch, access)).await,
            AnyTransport::GitCli(t) => self.deadline("fetch", t.fetch(path, branch, access)).await,
        }?;
        debug!(branch, ?outcome, "fetched push branch");
        Ok(outcome)
    }

    /// Push `branch` of the working copy at `path` to the same-named branch
    /// on the remote.
    ///
    /// # Errors
    /// Returns [`Error::PushFailed`] with a normalized message when the
    /// remote rejects the push.
    pub async fn push(&self, path: &Path, branch: &str, access: &RepoAccess) -> Result<()> {
        let pushed = match &self.transport {
            AnyTransport::Libgit2(t) => self.deadline("push", t.push(path, branch, access)).await,
            AnyTransport::GitCli(t) => self.deadline("push", t.push(path, branch, access)).await,
        };
        pushed.map_err(|e| match e {
            Error::PushFailed(message) => {
                Error::PushFailed(normalize_push_error(self.implementation, &message))
            }
            other => other,
        })
    }

    async fn deadline<T>(
        &self,
        operation: &'static str,
        future: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::time::timeout(self.timeout, future)
            .await
            .map_err(|_| Error::Timeout {
                operation,
                timeout: self.timeout,
            })?
    }
}
