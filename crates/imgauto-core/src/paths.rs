//! Joining untrusted relative paths onto a working copy root.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::Result;

/// Symlinks followed before giving up on a path.
const MAX_SYMLINK_EXPANSIONS: usize = 255;

/// Join `unsafe_path` onto `root` such that the result never leaves `root`.
///
/// `..` components are clamped at the root. Symlinks met along the way are
/// resolved as if `root` were the filesystem root: absolute targets restart
/// from `root`, relative targets are resolved against the link's directory.
/// Components that do not exist are joined lexically.
///
/// # Errors
/// Returns error if a symlink cannot be read or there are too many of them.
pub fn secure_join(root: &Path, unsafe_path: &str) -> Result<PathBuf> {
    let mut pending: VecDeque<OsString> = components(Path::new(unsafe_path));
    let mut resolved: Vec<OsString> = Vec::new();
    let mut expansions = 0usize;

    while let Some(part) = pending.pop_front() {
        if part == "." {
            continue;
        }
        if part == ".." {
            resolved.pop();
            continue;
        }

        let candidate = resolved
            .iter()
            .chain(std::iter::once(&part))
            .fold(root.to_path_buf(), |path, c| path.join(c));

        let is_symlink = fs::symlink_metadata(&candidate)
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false);
        if !is_symlink {
            resolved.push(part);
            continue;
        }

        expansions += 1;
        if expansions > MAX_SYMLINK_EXPANSIONS {
            return Err(io::Error::other(format!(
                "too many symlinks while resolving {unsafe_path:?}"
            ))
            .into());
        }

        let target = fs::read_link(&candidate)?;
        if target.is_absolute() {
            resolved.clear();
        }
        for component in components(&target).into_iter().rev() {
            pending.push_front(component);
        }
    }

    Ok(resolved.iter().fold(root.to_path_buf(), |path, c| path.join(c)))
}

/// Normal, `.` and `..` components of `path`; roots and prefixes dropped.
fn components(path: &Path) -> VecDeque<OsString> {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_os_string()),
            Component::CurDir => Some(".".into()),
            Component::ParentDir => Some("..".into()),
            Component::RootDir | Component::Prefix(_) => None,
        })
        .collect()
}
