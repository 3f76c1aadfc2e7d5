//! `git` executable transport.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::ExposeSecret;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::debug;

use super::{CheckoutRef, FetchOutcome, Transport, branch_refspec};
use crate::auth::{GitAuth, RepoAccess, url_user};
use crate::error::{Error, Result};

/// Network operations through the `git` executable.
///
/// Processes are killed when the future driving them is dropped, which is
/// how deadlines interrupt them.
#[derive(Debug, Clone)]
pub struct CliTransport {
    remote: String,
}

impl CliTransport {
    /// Create a transport talking to the remote named `remote`.
    #[must_use]
    pub fn new(remote: &str) -> Self {
        Self {
            remote: remote.to_string(),
        }
    }
}

impl Transport for CliTransport {
    async fn clone_repository(
        &self,
        access: &RepoAccess,
        reference: Option<&CheckoutRef>,
        path: &Path,
    ) -> Result<()> {
        let reference = reference.cloned().unwrap_or_default();
        let target = path.to_string_lossy().into_owned();

        let mut args = vec!["clone", "--origin", self.remote.as_str()];
        if let Some(name) = reference.tag.as_ref().or(reference.branch.as_ref()) {
            args.extend(["--branch", name.as_str()]);
        }
        args.extend(["--", access.url.as_str(), target.as_str()]);

        let output = git(None, &args, access).await?;
        if !output.status.success() {
            return Err(Error::CloneFailed(stderr(&output)));
        }

        if let Some(commit) = &reference.commit {
            let output = git(Some(path), &["checkout", "--detach", commit], access).await?;
            if !output.status.success() {
                return Err(Error::RefNotFound(commit.clone()));
            }
        }
        Ok(())
    }

    async fn fetch(&self, path: &Path, branch: &str, access: &RepoAccess) -> Result<FetchOutcome> {
        let refspec = branch_refspec(branch);
        let args = ["fetch", "--update-head-ok", self.remote.as_str(), refspec.as_str()];

        let output = git(Some(path), &args, access).await?;
        if output.status.success() {
            return Ok(FetchOutcome::Fetched);
        }

        let message = stderr(&output);
        if message.contains("couldn't find remote ref") {
            Ok(FetchOutcome::BranchMissing)
        } else {
            Err(Error::FetchFailed(message))
        }
    }

    async fn push(&self, path: &Path, branch: &str, access: &RepoAccess) -> Result<()> {
        let refspec = branch_refspec(branch);
        let args = ["push", self.remote.as_str(), refspec.as_str()];

        let output = git(Some(path), &args, access).await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(Error::PushFailed(stderr(&output)))
        }
    }
}

/// Run `git` with the credentials of `access` supplied through the
/// environment.
async fn git(dir: Option<&Path>, args: &[&str], access: &RepoAccess) -> Result<Output> {
    let credentials = Credentials::prepare(access)?;
    let mut command = git_command(dir, args, &credentials);

    debug!(command = args.first().copied().unwrap_or_default(), "running git");
    let output = command.output().await?;
    drop(credentials);
    Ok(output)
}

/// `git` invocation with prompts disabled and messages in the C locale, so
/// stderr can be matched against git's own wording.
fn git_command(dir: Option<&Path>, args: &[&str], credentials: &Credentials) -> Command {
    let mut command = Command::new("git");
    command
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .env("LC_ALL", "C")
        .envs(credentials.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .kill_on_drop(true);
    if let Some(dir) = dir {
        command.current_dir(dir);
    }
    command
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim_end().to_string()
}

/// Environment carrying credentials to one `git` process, plus the
/// directory holding any key material written for it.
struct Credentials {
    env: Vec<(String, String)>,
    _dir: Option<TempDir>,
}

impl Credentials {
    fn prepare(access: &RepoAccess) -> Result<Self> {
        match &access.auth {
            None => Ok(Self {
                env: Vec::new(),
                _dir: None,
            }),
            Some(GitAuth::Basic { username, password }) => {
                let token = STANDARD.encode(format!("{username}:{}", password.expose_secret()));
                Ok(Self {
                    env: vec![
                        ("GIT_CONFIG_COUNT".into(), "1".into()),
                        ("GIT_CONFIG_KEY_0".into(), "http.extraHeader".into()),
                        (
                            "GIT_CONFIG_VALUE_0".into(),
                            format!("Authorization: Basic {token}"),
                        ),
                    ],
                    _dir: None,
                })
            }
            Some(GitAuth::Ssh {
                username,
                identity,
                passphrase,
                known_hosts,
            }) => {
                if passphrase.is_some() {
                    return Err(Error::Auth(
                        "the git-cli implementation cannot use passphrase-protected SSH keys".into(),
                    ));
                }
                let dir = TempDir::new()?;
                let identity_path = write_private(dir.path(), "identity", identity.expose_secret())?;
                let known_hosts_path = write_private(dir.path(), "known_hosts", known_hosts)?;

                let mut ssh = format!(
                    "ssh -i '{}' -o IdentitiesOnly=yes -o StrictHostKeyChecking=yes -o UserKnownHostsFile='{}'",
                    identity_path.display(),
                    known_hosts_path.display()
                );
                if url_user(&access.url).is_none() {
                    ssh.push_str(&format!(" -l '{username}'"));
                }

                Ok(Self {
                    env: vec![("GIT_SSH_COMMAND".into(), ssh)],
                    _dir: Some(dir),
                })
            }
        }
    }
}

fn write_private(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    let mut content = content.to_string();
    if !content.ends_with('\n') {
        content.push('\n');
    }
    fs::write(&path, content)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(path)
}
