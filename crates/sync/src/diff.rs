//! File-level diff between a source tree and a target tree, plus the
//! read-only text diffs used for detail views.

use crate::ignore::{get_ignore_patterns, IgnoreMatcher};
use crate::walk::relative_files;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use similar::TextDiff;
use std::fmt;
use std::fs;
use std::path::Path;

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "py", "md", "json", "js", "html", "css", "xml", "yaml", "yml", "bat", "sh", "ps1",
];

/// Classification of a single differing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiffKind {
    /// Only in the source.
    New,
    /// In both, with different bytes.
    Modified,
    /// Only in the target.
    Deleted,
}

impl DiffKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Modified => "Modified",
            Self::Deleted => "Deleted",
        }
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A differing file, identified by its `/`-separated path relative to both roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffFileEntry {
    pub rel_path: String,
    pub kind: DiffKind,
}

/// True when the two files' bytes differ, or when either cannot be read.
pub fn files_are_different(a: &Path, b: &Path) -> bool {
    match (fs::read(a), fs::read(b)) {
        (Ok(left), Ok(right)) => left != right,
        _ => true,
    }
}

/// Lists every file that differs between `source_dir` and `target_dir`.
///
/// When `ignore_patterns` is `None` the source's own ignore file is used.
/// The same patterns prune both walks. The result is sorted by path, then
/// by kind name.
pub fn collect_diff_files(
    source_dir: &Path,
    target_dir: &Path,
    ignore_patterns: Option<&[String]>,
) -> Vec<DiffFileEntry> {
    let patterns = match ignore_patterns {
        Some(patterns) => patterns.to_vec(),
        None => get_ignore_patterns(source_dir),
    };
    let matcher = IgnoreMatcher::new(&patterns);
    let matcher = (!matcher.is_empty()).then_some(&matcher);

    let mut entries = Vec::new();

    for rel in relative_files(source_dir, matcher) {
        let src = source_dir.join(&rel);
        let tgt = target_dir.join(&rel);
        if !tgt.exists() {
            entries.push(DiffFileEntry {
                rel_path: rel,
                kind: DiffKind::New,
            });
        } else if files_are_different(&src, &tgt) {
            entries.push(DiffFileEntry {
                rel_path: rel,
                kind: DiffKind::Modified,
            });
        }
    }

    for rel in relative_files(target_dir, matcher) {
        if !source_dir.join(&rel).exists() {
            entries.push(DiffFileEntry {
                rel_path: rel,
                kind: DiffKind::Deleted,
            });
        }
    }

    entries.sort_by(|a, b| {
        a.rel_path
            .cmp(&b.rel_path)
            .then_with(|| a.kind.as_str().cmp(b.kind.as_str()))
    });
    entries
}

/// Whether `name` has an extension the detail view can render as text.
pub fn is_text_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            TEXT_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Unified diff from the target's text to the source's text.
///
/// Empty when the texts are equal.
pub fn text_diff(target_text: &str, source_text: &str) -> String {
    TextDiff::from_lines(target_text, source_text)
        .unified_diff()
        .context_radius(3)
        .header("Target", "Source")
        .to_string()
}

/// Unified diff of two MCP server values, pretty-printed.
pub fn mcp_value_diff(source: &Value, target: &Value) -> String {
    let render = |v: &Value| {
        let mut text = serde_json::to_string_pretty(v).unwrap_or_default();
        text.push('\n');
        text
    };
    text_diff(&render(target), &render(source))
}

/// Unified diff of one file present under both roots.
///
/// Returns `None` for non-text files; a missing side diffs as empty text.
pub fn file_text_diff(source_dir: &Path, target_dir: &Path, rel_path: &str) -> Option<String> {
    if !is_text_file(rel_path) {
        return None;
    }
    let read = |root: &Path| {
        fs::read(root.join(rel_path))
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default()
    };
    Some(text_diff(&read(target_dir), &read(source_dir)))
}
