//! Top-down directory walk with per-level ignore pruning.

use crate::ignore::IgnoreMatcher;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// One visited directory: its surviving subdirectory and file names, sorted.
#[derive(Debug)]
pub(crate) struct DirLevel {
    pub(crate) path: PathBuf,
    pub(crate) dirs: Vec<OsString>,
    pub(crate) files: Vec<OsString>,
}

/// Walks `root` pre-order, children sorted by name.
///
/// Ignored names are removed at each level before recursing, so an ignored
/// directory prunes its whole subtree. Symlinked directories are listed but
/// not entered. Unreadable directories are skipped.
pub(crate) fn walk_pruned(root: &Path, matcher: Option<&IgnoreMatcher>) -> Vec<DirLevel> {
    let mut levels = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::debug!(path = %dir.display(), error = %err, "skipping unreadable directory");
                continue;
            }
        };

        let mut dirs = Vec::new();
        let mut files = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name();
            if matcher.is_some_and(|m| m.is_ignored_os(&name)) {
                continue;
            }
            let is_dir = match entry.file_type() {
                Ok(ft) if ft.is_symlink() => entry.path().is_dir(),
                Ok(ft) => ft.is_dir(),
                Err(_) => false,
            };
            if is_dir {
                dirs.push(name);
            } else {
                files.push(name);
            }
        }
        dirs.sort();
        files.sort();

        for name in dirs.iter().rev() {
            let child = dir.join(name);
            let is_link = fs::symlink_metadata(&child)
                .map(|m| m.file_type().is_symlink())
                .unwrap_or(false);
            if !is_link {
                stack.push(child);
            }
        }

        levels.push(DirLevel {
            path: dir,
            dirs,
            files,
        });
    }

    levels
}

/// Every file under `root` that survives pruning, as `/`-separated paths
/// relative to `root`.
pub(crate) fn relative_files(root: &Path, matcher: Option<&IgnoreMatcher>) -> Vec<String> {
    let mut out = Vec::new();
    for level in walk_pruned(root, matcher) {
        for file in &level.files {
            let full = level.path.join(file);
            if let Some(rel) = to_posix_relative(root, &full) {
                out.push(rel);
            }
        }
    }
    out
}

/// `path` relative to `base`, with `/` separators.
pub(crate) fn to_posix_relative(base: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        return Some(".".to_string());
    }
    Some(parts.join("/"))
}
