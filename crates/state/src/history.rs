//! Recently used target paths, newest first.
//!
//! Two independent lists are kept: target skill directories and target MCP
//! files. Each holds at most [`HISTORY_LIMIT`] entries, deduplicated by
//! case-normalized path.

use crate::env::history_file;
use crate::persistence::{quarantine, unix_now, write_json_atomic};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub path: PathBuf,
    /// Unix seconds.
    pub time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Skill,
    Mcp,
}

impl HistoryKind {
    pub fn label(self) -> &'static str {
        match self {
            HistoryKind::Skill => "skill",
            HistoryKind::Mcp => "mcp",
        }
    }
}

/// An entry of the merged view returned by [`HistoryStore::all_history`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaggedHistoryItem {
    #[serde(flatten)]
    pub item: HistoryItem,
    #[serde(rename = "type")]
    pub kind: HistoryKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
struct HistoryData {
    skills_dirs: Vec<HistoryItem>,
    mcp_files: Vec<HistoryItem>,
}

impl HistoryData {
    fn list(&self, kind: HistoryKind) -> &Vec<HistoryItem> {
        match kind {
            HistoryKind::Skill => &self.skills_dirs,
            HistoryKind::Mcp => &self.mcp_files,
        }
    }

    fn list_mut(&mut self, kind: HistoryKind) -> &mut Vec<HistoryItem> {
        match kind {
            HistoryKind::Skill => &mut self.skills_dirs,
            HistoryKind::Mcp => &mut self.mcp_files,
        }
    }
}

/// File-backed history of target paths.
#[derive(Debug)]
pub struct HistoryStore {
    file: PathBuf,
    data: HistoryData,
}

impl HistoryStore {
    /// Loads the store from `file`.
    ///
    /// A file that does not parse is moved aside and the store starts empty.
    pub fn open(file: impl Into<PathBuf>) -> Self {
        let file = file.into();
        let data = match std::fs::read_to_string(&file) {
            Ok(text) => match parse_history(&text) {
                Some(data) => data,
                None => {
                    quarantine(&file);
                    HistoryData::default()
                }
            },
            Err(_) => HistoryData::default(),
        };
        Self { file, data }
    }

    /// Loads the store from the default history file.
    pub fn open_default() -> Result<Self> {
        Ok(Self::open(history_file()?))
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn skills_dirs(&self) -> Vec<&Path> {
        self.paths(HistoryKind::Skill)
    }

    pub fn mcp_files(&self) -> Vec<&Path> {
        self.paths(HistoryKind::Mcp)
    }

    pub fn add_skills_dir(&mut self, path: impl AsRef<Path>) {
        self.add(HistoryKind::Skill, path.as_ref());
    }

    pub fn add_mcp_file(&mut self, path: impl AsRef<Path>) {
        self.add(HistoryKind::Mcp, path.as_ref());
    }

    pub fn remove_skills_dir(&mut self, path: impl AsRef<Path>) {
        self.remove(HistoryKind::Skill, path.as_ref());
    }

    pub fn remove_mcp_file(&mut self, path: impl AsRef<Path>) {
        self.remove(HistoryKind::Mcp, path.as_ref());
    }

    /// Removes `path` from both lists. Returns whether anything was removed.
    pub fn remove_everywhere(&mut self, path: impl AsRef<Path>) -> bool {
        let before = self.data.skills_dirs.len() + self.data.mcp_files.len();
        let key = case_key(&normalize_path(path.as_ref()));
        for kind in [HistoryKind::Skill, HistoryKind::Mcp] {
            self.data
                .list_mut(kind)
                .retain(|item| case_key(&item.path) != key);
        }
        let removed = before != self.data.skills_dirs.len() + self.data.mcp_files.len();
        if removed {
            self.save();
        }
        removed
    }

    /// Drops entries whose path no longer exists. Returns how many went.
    pub fn clear_missing(&mut self) -> usize {
        let mut removed = 0;
        for kind in [HistoryKind::Skill, HistoryKind::Mcp] {
            let list = self.data.list_mut(kind);
            let before = list.len();
            list.retain(|item| item.path.exists());
            removed += before - list.len();
        }
        if removed > 0 {
            self.save();
        }
        removed
    }

    /// Both lists merged and tagged, newest first.
    pub fn all_history(&self) -> Vec<TaggedHistoryItem> {
        let mut all: Vec<TaggedHistoryItem> = [HistoryKind::Skill, HistoryKind::Mcp]
            .into_iter()
            .flat_map(|kind| {
                self.data
                    .list(kind)
                    .iter()
                    .cloned()
                    .map(move |item| TaggedHistoryItem { item, kind })
            })
            .collect();
        all.sort_by(|a, b| b.item.time.total_cmp(&a.item.time));
        all
    }

    fn paths(&self, kind: HistoryKind) -> Vec<&Path> {
        self.data
            .list(kind)
            .iter()
            .map(|item| item.path.as_path())
            .collect()
    }

    fn add(&mut self, kind: HistoryKind, path: &Path) {
        let path = normalize_path(path);
        let key = case_key(&path);
        let list = self.data.list_mut(kind);
        list.retain(|item| case_key(&item.path) != key);
        list.insert(
            0,
            HistoryItem {
                path,
                time: unix_now(),
            },
        );
        list.sort_by(|a, b| b.time.total_cmp(&a.time));
        list.truncate(HISTORY_LIMIT);
        self.save();
    }

    fn remove(&mut self, kind: HistoryKind, path: &Path) {
        let key = case_key(&normalize_path(path));
        self.data
            .list_mut(kind)
            .retain(|item| case_key(&item.path) != key);
        self.save();
    }

    fn save(&self) {
        if let Err(err) = write_json_atomic(&self.file, &self.data) {
            tracing::warn!(path = %self.file.display(), error = %err, "failed to save history");
        }
    }
}

/// Parses a history document, or `None` when it is not one.
///
/// Entries may be bare path strings or `{path, time}` objects.
fn parse_history(text: &str) -> Option<HistoryData> {
    let doc: Value = serde_json::from_str(text).ok()?;
    let doc = doc.as_object()?;
    let list = |key: &str| match doc.get(key) {
        Some(Value::Array(items)) => Some(clean_items(items)),
        None | Some(Value::Null) => Some(Vec::new()),
        Some(_) => None,
    };
    Some(HistoryData {
        skills_dirs: list("skills_dirs")?,
        mcp_files: list("mcp_files")?,
    })
}

fn coerce_item(value: &Value) -> Option<HistoryItem> {
    let (path, time) = match value {
        Value::String(path) => (path.as_str(), 0.0),
        Value::Object(obj) => (
            obj.get("path")?.as_str()?,
            obj.get("time").and_then(Value::as_f64).unwrap_or(0.0),
        ),
        _ => return None,
    };
    if path.is_empty() {
        return None;
    }
    Some(HistoryItem {
        path: normalize_path(Path::new(path)),
        time,
    })
}

fn clean_items(items: &[Value]) -> Vec<HistoryItem> {
    let mut coerced: Vec<HistoryItem> = items.iter().filter_map(coerce_item).collect();
    coerced.sort_by(|a, b| b.time.total_cmp(&a.time));
    let mut seen = HashSet::new();
    coerced.retain(|item| seen.insert(case_key(&item.path)));
    coerced
}

/// Lexically normalizes `path`: drops `.` components and folds `..` into
/// the preceding component where possible. The file system is not touched.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Comparison key for deduplication: case-folded where the platform's file
/// system is case-insensitive.
fn case_key(path: &Path) -> String {
    let text = path.to_string_lossy();
    if cfg!(windows) {
        text.replace('/', "\\").to_lowercase()
    } else {
        text.into_owned()
    }
}
