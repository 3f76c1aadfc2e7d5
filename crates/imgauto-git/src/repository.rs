//! Repository wrapper providing the working-tree operations of a run.
//!
//! Whichever backend cloned, fetched or pushed, branch switching and
//! committing always go through this `git2` view of the working copy.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use git2::{BranchType, Oid, Signature, Status, StatusOptions};
use tracing::debug;

use crate::error::{Error, Result};
use crate::signing::SigningKey;

/// Commit author identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    /// Author name.
    pub name: String,
    /// Author email.
    pub email: String,
}

/// Outcome of committing the working tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A commit was created on HEAD.
    Committed(Oid),
    /// Nothing in the working tree differed from HEAD.
    NoChanges,
}

/// High-level wrapper around a git repository.
pub struct Repository {
    inner: git2::Repository,
}

impl Repository {
    /// Open the repository whose working tree is exactly `path`.
    ///
    /// # Errors
    /// Returns error if no repository is found at path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let inner = git2::Repository::open(path)?;
        if inner.is_bare() {
            return Err(Error::NotARepository);
        }
        Ok(Self { inner })
    }

    /// Get the path to the repository root (workdir).
    #[must_use]
    pub fn workdir(&self) -> Option<&Path> {
        self.inner.workdir()
    }

    /// Get the path to the .git directory.
    #[must_use]
    pub fn git_dir(&self) -> &Path {
        self.inner.path()
    }

    // === Branch operations ===

    /// Get the name of the current branch.
    ///
    /// # Errors
    /// Returns error if HEAD is detached.
    pub fn current_branch(&self) -> Result<String> {
        let head = self.inner.head()?;
        if !head.is_branch() {
            return Err(Error::RefNotFound("HEAD".into()));
        }

        head.shorthand()
            .map(String::from)
            .ok_or_else(|| Error::RefNotFound("HEAD".into()))
    }

    /// Get the commit HEAD points at.
    ///
    /// # Errors
    /// Returns error if HEAD is unborn.
    pub fn head_commit(&self) -> Result<Oid> {
        Ok(self.inner.head()?.peel_to_commit()?.id())
    }

    /// Check if a local branch exists.
    #[must_use]
    pub fn branch_exists(&self, name: &str) -> bool {
        self.inner.find_branch(name, BranchType::Local).is_ok()
    }

    /// Create a new branch at the current HEAD.
    ///
    /// # Errors
    /// Returns error if branch creation fails.
    pub fn create_branch(&self, name: &str) -> Result<Oid> {
        let head_commit = self.inner.head()?.peel_to_commit()?;
        let branch = self.inner.branch(name, &head_commit, false)?;

        branch
            .get()
            .target()
            .ok_or_else(|| Error::BranchNotFound(name.into()))
    }

    /// Checkout a local branch.
    ///
    /// # Errors
    /// Returns error if checkout fails.
    pub fn checkout(&self, branch_name: &str) -> Result<()> {
        let branch = self
            .inner
            .find_branch(branch_name, BranchType::Local)
            .map_err(|_| Error::BranchNotFound(branch_name.into()))?;

        let object = branch.get().peel(git2::ObjectType::Commit)?;

        self.inner.checkout_tree(&object, None)?;
        self.inner.set_head(&format!("refs/heads/{branch_name}"))?;

        Ok(())
    }

    /// Check out `branch`, creating it at HEAD first if it does not exist
    /// locally.
    ///
    /// # Errors
    /// Returns error if creation or checkout fails.
    pub fn switch_branch(&self, branch: &str) -> Result<()> {
        if !self.branch_exists(branch) {
            let head = self.create_branch(branch)?;
            debug!(branch, %head, "created local branch from HEAD");
        }
        self.checkout(branch)
    }

    // === Working directory state ===

    /// Paths (relative to the root) that differ from HEAD, untracked files
    /// included and ignored files excluded.
    ///
    /// # Errors
    /// Returns error if status check fails.
    pub fn changed_paths(&self) -> Result<Vec<String>> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self.inner.statuses(Some(&mut options))?;
        Ok(statuses
            .iter()
            .filter(|entry| !entry.status().intersects(Status::CURRENT | Status::IGNORED))
            .filter_map(|entry| entry.path().map(String::from))
            .collect())
    }

    // === Commit operations ===

    /// Stage every change in the working tree and commit it on HEAD.
    ///
    /// Broken symlinks are never staged. When a signing key is given the
    /// commit carries a detached armored signature in its `gpgsig` header.
    ///
    /// # Errors
    /// Returns error if staging, signing or committing fails.
    pub fn commit_changes(
        &self,
        author: &Author,
        message: &str,
        signer: Option<&SigningKey>,
    ) -> Result<CommitOutcome> {
        let workdir = self.workdir().ok_or(Error::NotARepository)?;
        let mut index = self.inner.index()?;
        let mut staged = 0usize;

        for path in self.changed_paths()? {
            let absolute = workdir.join(&path);
            match fs::symlink_metadata(&absolute) {
                Ok(meta) if meta.file_type().is_symlink() && !absolute.exists() => {
                    debug!(path, "skipping broken symlink");
                    continue;
                }
                Ok(_) => index.add_path(Path::new(&path))?,
                Err(e) if e.kind() == ErrorKind::NotFound => index.remove_path(Path::new(&path))?,
                Err(e) => return Err(e.into()),
            }
            staged += 1;
        }

        if staged == 0 {
            return Ok(CommitOutcome::NoChanges);
        }

        index.write()?;
        let tree = self.inner.find_tree(index.write_tree()?)?;
        let parent = self.inner.head()?.peel_to_commit()?;
        let signature = Signature::now(&author.name, &author.email)?;

        let oid = match signer {
            None => self.inner.commit(
                Some("HEAD"),
                &signature,
                &signature,
                message,
                &tree,
                &[&parent],
            )?,
            Some(key) => {
                let buffer = self.inner.commit_create_buffer(
                    &signature,
                    &signature,
                    message,
                    &tree,
                    &[&parent],
                )?;
                let content = buffer
                    .as_str()
                    .ok_or_else(|| Error::Signing("commit buffer is not valid UTF-8".into()))?;
                let armored = key.sign(content.as_bytes())?;
                let oid = self.inner.commit_signed(content, &armored, Some("gpgsig"))?;
                self.advance_head(oid, message)?;
                oid
            }
        };

        debug!(revision = %oid, files = staged, "committed working tree");
        Ok(CommitOutcome::Committed(oid))
    }

    /// Point HEAD (or the branch it names) at `oid`.
    fn advance_head(&self, oid: Oid, message: &str) -> Result<()> {
        let head = self.inner.head()?;
        if head.is_branch() {
            let name = head
                .name()
                .ok_or_else(|| Error::RefNotFound("HEAD".into()))?;
            self.inner.reference(name, oid, true, message)?;
        } else {
            self.inner.set_head_detached(oid)?;
        }
        Ok(())
    }

    // === Low-level access ===

    /// Get a reference to the underlying git2 repository.
    ///
    /// Use sparingly - prefer high-level methods.
    #[must_use]
    pub const fn inner(&self) -> &git2::Repository {
        &self.inner
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.git_dir())
            .finish()
    }
}
