//! Push error normalization.
//!
//! Each backend surfaces push failures in its own way. The git executable
//! hands back stderr, which for some providers (GitLab, at least) is nothing
//! but a bare `remote:` marker. libgit2 carries the whole server output,
//! often wrapped in a banner of `remote:` lines and `=` fencing.

use crate::backend::GitImplementation;

/// Message used when the server gave no reason for rejecting a push.
pub const EMPTY_REMOTE_MESSAGE: &str = "push rejected; check git secret has write access";

/// Turn a raw push failure into a readable message for `implementation`.
#[must_use]
pub fn normalize_push_error(implementation: GitImplementation, message: &str) -> String {
    match implementation {
        GitImplementation::GitCli => normalize_empty_remote(message),
        GitImplementation::Libgit2 => normalize_remote_banner(message),
    }
}

fn normalize_empty_remote(message: &str) -> String {
    if message.trim() == "remote:" {
        EMPTY_REMOTE_MESSAGE.to_string()
    } else {
        message.to_string()
    }
}

fn normalize_remote_banner(message: &str) -> String {
    let lines: Vec<&str> = message.split('\n').collect();
    if lines.len() == 1 {
        return message.to_string();
    }

    let parts: Vec<&str> = lines
        .iter()
        .map(|line| {
            line.strip_prefix("remote:")
                .unwrap_or(line)
                .trim_matches(|c| c == ' ' || c == '\t' || c == '=')
        })
        .filter(|part| !part.is_empty())
        .collect();

    format!("remote: {}", parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_empty_remote_marker() {
        let normalized = normalize_push_error(GitImplementation::GitCli, "  remote:\n");
        assert_eq!(normalized, EMPTY_REMOTE_MESSAGE);
    }

    #[test]
    fn test_cli_passes_other_errors_through() {
        let message = "remote: Permission to org/repo.git denied to bot.";
        assert_eq!(normalize_push_error(GitImplementation::GitCli, message), message);
    }

    #[test]
    fn test_libgit2_strips_banner() {
        let message = "remote:\nremote: ========================================\nremote:\nremote: You are not allowed to push code to this project.\nremote:\nremote: ========================================\nremote:";
        assert_eq!(
            normalize_push_error(GitImplementation::Libgit2, message),
            "remote: You are not allowed to push code to this project."
        );
    }

    #[test]
    fn test_libgit2_joins_multiple_lines() {
        let message = "remote: error: GH006: Protected branch update failed\n\tremote: Changes must be made through a pull request.";
        assert_eq!(
            normalize_push_error(GitImplementation::Libgit2, message),
            "remote: error: GH006: Protected branch update failed remote: Changes must be made through a pull request."
        );
    }

    #[test]
    fn test_libgit2_single_line_unchanged() {
        let message = "unexpected http status code: 403";
        assert_eq!(normalize_push_error(GitImplementation::Libgit2, message), message);
    }
}
