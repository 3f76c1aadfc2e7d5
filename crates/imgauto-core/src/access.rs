//! Resolve the URL and credentials a run clones and pushes with.

use imgauto_git::{GitAuth, RepoAccess, SecretString, UrlKind, classify_url, url_user};
use tracing::debug;

use crate::error::{Error, Result};
use crate::object::ObjectKey;
use crate::source::{GitRepository, Secret};
use crate::traits::SecretStore;

/// User presented to SSH servers when the URL names none.
const DEFAULT_SSH_USER: &str = "git";

/// Build the [`RepoAccess`] for `repository`, reading its auth secret from
/// the repository's namespace.
///
/// # Errors
/// Returns [`Error::AuthSecret`] if the referenced secret cannot be fetched
/// and [`Error::Auth`] if it lacks fields the URL's transport needs.
pub async fn repo_access<S: SecretStore>(store: &S, repository: &GitRepository) -> Result<RepoAccess> {
    let url = repository.spec.url.clone();
    let Some(secret_ref) = &repository.spec.secret_ref else {
        return Ok(RepoAccess::anonymous(url));
    };

    let key = ObjectKey::new(&repository.metadata.namespace, &secret_ref.name);
    let secret = store
        .get_secret(&key)
        .await
        .map_err(|e| Error::AuthSecret(e.to_string()))?
        .ok_or_else(|| Error::AuthSecret(format!("secret '{key}' not found")))?;

    let auth = auth_from_secret(&url, &secret)?;
    debug!(secret = %key, url = %url, authenticated = auth.is_some(), "resolved repository access");
    Ok(RepoAccess { url, auth })
}

/// Credentials for `url` taken from `secret`, chosen by the URL's transport.
///
/// # Errors
/// Returns [`Error::Auth`] if a required field is missing.
pub fn auth_from_secret(url: &str, secret: &Secret) -> Result<Option<GitAuth>> {
    let key = secret.metadata.key();
    match classify_url(url) {
        UrlKind::Http => {
            match (secret.text("username"), secret.text("password")) {
                (Some(username), Some(password)) => Ok(Some(GitAuth::Basic {
                    username: username.to_string(),
                    password: SecretString::from(password),
                })),
                // secrets without basic credentials may carry TLS data only
                (None, None) => Ok(None),
                (Some(_), None) => Err(missing(&key, "password")),
                (None, Some(_)) => Err(missing(&key, "username")),
            }
        }
        UrlKind::Ssh => {
            let identity = secret.text("identity").ok_or_else(|| missing(&key, "identity"))?;
            let known_hosts = secret
                .text("known_hosts")
                .ok_or_else(|| missing(&key, "known_hosts"))?;
            Ok(Some(GitAuth::Ssh {
                username: url_user(url).unwrap_or_else(|| DEFAULT_SSH_USER.to_string()),
                identity: SecretString::from(identity),
                passphrase: secret.text("password").map(SecretString::from),
                known_hosts: known_hosts.to_string(),
            }))
        }
        UrlKind::Other => Ok(None),
    }
}

fn missing(secret: &ObjectKey, field: &str) -> Error {
    Error::Auth(format!("secret '{secret}' is missing field '{field}'"))
}
