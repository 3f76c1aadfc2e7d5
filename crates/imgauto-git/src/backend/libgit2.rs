//! libgit2 transport.

use std::path::Path;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{
    CertificateCheckStatus, Cred, CredentialType, Direction, FetchOptions, Oid, PushOptions,
    RemoteCallbacks,
};
use secrecy::ExposeSecret;
use tokio::task;

use super::{CheckoutRef, FetchOutcome, Transport, branch_refspec};
use crate::auth::{GitAuth, RepoAccess, known_host_matches, url_host};
use crate::error::{Error, Result};

/// Credentials are offered at most this many times per operation; libgit2
/// keeps asking for as long as the callback keeps answering.
const MAX_CREDENTIAL_ATTEMPTS: u32 = 3;

/// Network operations through libgit2.
#[derive(Debug, Clone)]
pub struct Libgit2Transport {
    remote: String,
}

impl Libgit2Transport {
    /// Create a transport talking to the remote named `remote`.
    #[must_use]
    pub fn new(remote: &str) -> Self {
        Self {
            remote: remote.to_string(),
        }
    }
}

impl Transport for Libgit2Transport {
    async fn clone_repository(
        &self,
        access: &RepoAccess,
        reference: Option<&CheckoutRef>,
        path: &Path,
    ) -> Result<()> {
        let access = access.clone();
        let reference = reference.cloned().unwrap_or_default();
        let path = path.to_path_buf();
        let remote = self.remote.clone();

        blocking(move || clone_blocking(&access, &reference, &path, &remote)).await
    }

    async fn fetch(&self, path: &Path, branch: &str, access: &RepoAccess) -> Result<FetchOutcome> {
        let access = access.clone();
        let path = path.to_path_buf();
        let branch = branch.to_string();
        let remote = self.remote.clone();

        blocking(move || fetch_blocking(&path, &branch, &access, &remote)).await
    }

    async fn push(&self, path: &Path, branch: &str, access: &RepoAccess) -> Result<()> {
        let access = access.clone();
        let path = path.to_path_buf();
        let branch = branch.to_string();
        let remote = self.remote.clone();

        blocking(move || push_blocking(&path, &branch, &access, &remote)).await
    }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
}

fn clone_blocking(
    access: &RepoAccess,
    reference: &CheckoutRef,
    path: &Path,
    remote: &str,
) -> Result<()> {
    let mut fetch = FetchOptions::new();
    fetch.remote_callbacks(callbacks(access));

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch);
    builder.remote_create(move |repo, _name, url| repo.remote(remote, url));
    if let Some(branch) = &reference.branch {
        builder.branch(branch);
    }

    let repo = builder
        .clone(&access.url, path)
        .map_err(|e| Error::CloneFailed(e.message().to_string()))?;

    let detached = if let Some(commit) = &reference.commit {
        let oid = Oid::from_str(commit).map_err(|_| Error::RefNotFound(commit.clone()))?;
        Some(
            repo.find_commit(oid)
                .map_err(|_| Error::RefNotFound(commit.clone()))?,
        )
    } else if let Some(tag) = &reference.tag {
        let object = repo
            .revparse_single(&format!("refs/tags/{tag}"))
            .map_err(|_| Error::RefNotFound(format!("tag {tag}")))?;
        Some(object.peel_to_commit()?)
    } else {
        None
    };

    if let Some(commit) = detached {
        repo.checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().force()))?;
        repo.set_head_detached(commit.id())?;
    }
    Ok(())
}

fn fetch_blocking(
    path: &Path,
    branch: &str,
    access: &RepoAccess,
    remote: &str,
) -> Result<FetchOutcome> {
    let repo = git2::Repository::open(path)?;
    let mut origin = repo
        .find_remote(remote)
        .map_err(|_| Error::RemoteNotFound(remote.to_string()))?;

    let wanted = format!("refs/heads/{branch}");
    let exists = {
        let connection = origin
            .connect_auth(Direction::Fetch, Some(callbacks(access)), None)
            .map_err(|e| Error::FetchFailed(e.message().to_string()))?;
        connection
            .list()?
            .iter()
            .any(|head| head.name() == wanted)
    };
    if !exists {
        return Ok(FetchOutcome::BranchMissing);
    }

    let mut options = FetchOptions::new();
    options.remote_callbacks(callbacks(access));
    match origin.fetch(&[branch_refspec(branch)], Some(&mut options), None) {
        Ok(()) => Ok(FetchOutcome::Fetched),
        Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(FetchOutcome::BranchMissing),
        Err(e) => Err(Error::FetchFailed(e.message().to_string())),
    }
}

fn push_blocking(path: &Path, branch: &str, access: &RepoAccess, remote: &str) -> Result<()> {
    let repo = git2::Repository::open(path)?;
    let mut origin = repo
        .find_remote(remote)
        .map_err(|_| Error::RemoteNotFound(remote.to_string()))?;

    let mut remote_output = String::new();
    let mut rejection: Option<String> = None;
    let result = {
        let mut cb = callbacks(access);
        cb.sideband_progress(|data| {
            remote_output.push_str(&String::from_utf8_lossy(data));
            true
        });
        cb.push_update_reference(|refname, status| {
            if let Some(status) = status {
                rejection = Some(format!("{refname}: {status}"));
            }
            Ok(())
        });
        let mut options = PushOptions::new();
        options.remote_callbacks(cb);
        origin.push(&[branch_refspec(branch)], Some(&mut options))
    };

    let failure = match (result, rejection) {
        (Ok(()), None) => return Ok(()),
        (Ok(()), Some(rejected)) => rejected,
        (Err(e), _) => e.message().to_string(),
    };

    let mut lines: Vec<String> = remote_output
        .lines()
        .map(|line| format!("remote: {line}"))
        .collect();
    lines.push(failure);
    Err(Error::PushFailed(lines.join("\n")))
}

/// Callbacks presenting the credentials of `access` and checking SSH host
/// keys against its `known_hosts`.
fn callbacks<'a>(access: &RepoAccess) -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();
    let Some(auth) = access.auth.clone() else {
        return callbacks;
    };

    if let GitAuth::Ssh { known_hosts, .. } = &auth {
        let known_hosts = known_hosts.clone();
        let port = url_host(&access.url).and_then(|(_, port)| port);
        callbacks.certificate_check(move |cert, host| {
            let Some(hostkey) = cert.as_hostkey() else {
                return Ok(CertificateCheckStatus::CertificatePassthrough);
            };
            let Some(key) = hostkey.hostkey() else {
                return Err(git2::Error::from_str("server did not present a host key"));
            };
            if known_host_matches(&known_hosts, host, port, key) {
                Ok(CertificateCheckStatus::CertificateOk)
            } else {
                Err(git2::Error::from_str(&format!(
                    "host key for {host} does not match known_hosts"
                )))
            }
        });
    }

    let mut attempts = 0;
    callbacks.credentials(move |_url, username_from_url, allowed| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str("credentials rejected by remote"));
        }
        match &auth {
            GitAuth::Basic { username, password }
                if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) =>
            {
                Cred::userpass_plaintext(username, password.expose_secret())
            }
            GitAuth::Ssh { username, .. } if allowed.contains(CredentialType::USERNAME) => {
                Cred::username(username_from_url.unwrap_or(username))
            }
            GitAuth::Ssh {
                username,
                identity,
                passphrase,
                ..
            } if allowed.contains(CredentialType::SSH_KEY) => Cred::ssh_key_from_memory(
                username_from_url.unwrap_or(username),
                None,
                identity.expose_secret(),
                passphrase.as_ref().map(|p| p.expose_secret()),
            ),
            _ => Err(git2::Error::from_str(
                "remote asked for a credential type that was not provided",
            )),
        }
    });

    callbacks
}
