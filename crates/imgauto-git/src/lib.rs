//! # imgauto-git
//!
//! Git operations for imgauto, built on git2-rs and the `git` executable.
//! Clone, fetch and push are available through two interchangeable
//! backends; branch switching and committing always go through the
//! `git2` working-tree view.

mod auth;
mod backend;
mod error;
mod normalize;
mod repository;
mod signing;

pub use auth::{GitAuth, RepoAccess, UrlKind, classify_url, url_user};
pub use backend::{
    Backend, CheckoutRef, CliTransport, FetchOutcome, GitImplementation, Libgit2Transport,
    Transport, branch_refspec,
};
pub use error::{Error, Result};
pub use git2::Oid;
pub use normalize::{EMPTY_REMOTE_MESSAGE, normalize_push_error};
pub use repository::{Author, CommitOutcome, Repository};
pub use secrecy::SecretString;
pub use signing::SigningKey;
