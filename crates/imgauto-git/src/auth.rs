//! Repository access: URL plus the credentials a backend presents.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::SecretString;
use url::{Host, Url};

/// Credentials for one remote.
#[derive(Debug, Clone)]
pub enum GitAuth {
    /// HTTP basic authentication.
    Basic {
        /// User name.
        username: String,
        /// Password or token.
        password: SecretString,
    },

    /// SSH public key authentication.
    Ssh {
        /// User name presented to the server (usually `git`).
        username: String,
        /// PEM/OpenSSH encoded private key.
        identity: SecretString,
        /// Passphrase for `identity`, if it is encrypted.
        passphrase: Option<SecretString>,
        /// `known_hosts` lines the server's host key must match.
        known_hosts: String,
    },
}

/// URL plus resolved authentication for a repository.
///
/// Owned by a single automation run and never shared between runs.
#[derive(Debug, Clone)]
pub struct RepoAccess {
    /// Remote URL.
    pub url: String,
    /// Credentials, or `None` for anonymous access.
    pub auth: Option<GitAuth>,
}

impl RepoAccess {
    /// Anonymous access to `url`.
    #[must_use]
    pub fn anonymous(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth: None,
        }
    }
}

/// Transport family of a remote URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    /// `http://` or `https://`.
    Http,
    /// `ssh://` or scp-like `user@host:path`.
    Ssh,
    /// Local paths, `file://`, or anything else.
    Other,
}

/// Classify a remote URL by transport.
#[must_use]
pub fn classify_url(url: &str) -> UrlKind {
    match parse_remote(url) {
        Some(Remote::Url(url)) => match url.scheme() {
            "http" | "https" => UrlKind::Http,
            "ssh" => UrlKind::Ssh,
            _ => UrlKind::Other,
        },
        Some(Remote::Scp { .. }) => UrlKind::Ssh,
        None => UrlKind::Other,
    }
}

/// A remote URL in one of the two syntaxes git accepts.
enum Remote<'a> {
    /// `scheme://[user@]host[:port]/path`.
    Url(Url),
    /// scp-like `[user@]host:path`.
    Scp { user: Option<&'a str>, host: &'a str },
}

fn parse_remote(url: &str) -> Option<Remote<'_>> {
    if url.contains("://") {
        return Url::parse(url).ok().map(Remote::Url);
    }

    let (user, rest) = match url.split_once('@') {
        Some((user, rest)) if !user.contains([':', '/']) => {
            (Some(user).filter(|u| !u.is_empty()), rest)
        }
        _ => (None, url),
    };
    let host = match rest.strip_prefix('[') {
        Some(bracketed) => {
            let (host, path) = bracketed.split_once(']')?;
            if !path.starts_with(':') {
                return None;
            }
            host
        }
        None => rest.split_once(':')?.0,
    };
    // `C:\repo` or `./a:b` are paths, not remotes
    if host.len() < 2 || host.contains('/') {
        return None;
    }
    Some(Remote::Scp { user, host })
}

/// User name embedded in a URL, if any.
#[must_use]
pub fn url_user(url: &str) -> Option<String> {
    match parse_remote(url)? {
        Remote::Url(url) => Some(url.username().to_string()).filter(|u| !u.is_empty()),
        Remote::Scp { user, .. } => user.map(str::to_string),
    }
}

/// Host and explicit port of a URL. IPv6 hosts come without brackets.
#[must_use]
pub fn url_host(url: &str) -> Option<(String, Option<u16>)> {
    match parse_remote(url)? {
        Remote::Url(url) => {
            let host = match url.host()? {
                Host::Domain(domain) => domain.to_string(),
                Host::Ipv4(addr) => addr.to_string(),
                Host::Ipv6(addr) => addr.to_string(),
            };
            Some((host, url.port()))
        }
        Remote::Scp { host, .. } => Some((host.to_string(), None)),
    }
}

/// Check a server host key against `known_hosts` content.
///
/// Plain host patterns (`host`, `[host]:port`, comma separated) are
/// supported; hashed entries and `@` markers never match.
#[must_use]
pub fn known_host_matches(known_hosts: &str, host: &str, port: Option<u16>, key: &[u8]) -> bool {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let wanted = match port {
        Some(port) if port != 22 => format!("[{host}]:{port}"),
        _ => host.to_string(),
    };

    known_hosts.lines().any(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('@') {
            return false;
        }
        let mut fields = line.split_whitespace();
        let (Some(hosts), Some(_key_type), Some(encoded)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return false;
        };
        hosts.split(',').any(|pattern| pattern == wanted)
            && STANDARD.decode(encoded).is_ok_and(|decoded| decoded == key)
    })
}
