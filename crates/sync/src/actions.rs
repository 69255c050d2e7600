//! Mutating operations driven by a comparison: skill import/delete and MCP
//! server import/delete/save.
//!
//! Batch operations never abort on a single failure; they return the
//! failures alongside the name of the item that failed.

use crate::error::JsoncError;
use crate::ignore::IgnoreMatcher;
use crate::jsonc::load_jsonc;
use crate::mcp::{server_map, MCP_SERVERS_KEY};
use crate::report::BatchFailure;
use crate::skills::SkillRow;
use crate::Result;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Component, Path};
use walkdir::WalkDir;

/// A skill chosen for import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSelection {
    /// Path relative to the skills root; may be nested.
    pub rel_path: String,
    pub name: String,
}

impl SkillSelection {
    /// Selection for a top-level skill where the name is the relative path.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            rel_path: name.clone(),
            name,
        }
    }

    fn basename(&self) -> &str {
        self.rel_path.rsplit('/').next().unwrap_or(&self.name)
    }
}

impl From<&SkillRow> for SkillSelection {
    fn from(row: &SkillRow) -> Self {
        Self {
            rel_path: row.entry.rel_path.clone(),
            name: row.entry.name.clone(),
        }
    }
}

/// Recursively removes `target_root/<name>` for each name.
pub fn delete_skill_dirs<S: AsRef<str>>(target_root: &Path, names: &[S]) -> Vec<BatchFailure> {
    let mut failures = Vec::new();
    for name in names {
        let name = name.as_ref();
        let result = check_single_component(name)
            .and_then(|()| fs::remove_dir_all(target_root.join(name)).map_err(Into::into));
        if let Err(err) = result {
            tracing::warn!(skill = name, error = %err, "failed to delete skill");
            failures.push(BatchFailure::new(name, format!("{err:#}")));
        }
    }
    failures
}

/// Copies each selected skill to `target_root/<basename>`, replacing any
/// existing destination and leaving out files the skill's ignore file names.
pub fn import_skills_to_target(
    skills_root: &Path,
    target_root: &Path,
    selected: &[SkillSelection],
) -> Vec<BatchFailure> {
    let mut failures = Vec::new();
    for item in selected {
        if let Err(err) = import_one(skills_root, target_root, item) {
            tracing::warn!(skill = %item.rel_path, error = %err, "failed to import skill");
            failures.push(BatchFailure::new(&item.rel_path, format!("{err:#}")));
        }
    }
    failures
}

fn import_one(skills_root: &Path, target_root: &Path, item: &SkillSelection) -> Result<()> {
    let name = item.basename();
    check_single_component(name)?;
    let src = skills_root.join(&item.rel_path);
    let dst = target_root.join(name);

    if !src.is_dir() {
        bail!("source skill directory not found: {}", src.display());
    }
    if dst.is_dir() {
        fs::remove_dir_all(&dst).with_context(|| format!("removing {}", dst.display()))?;
    } else if dst.exists() {
        fs::remove_file(&dst).with_context(|| format!("removing {}", dst.display()))?;
    }

    let matcher = IgnoreMatcher::from_dir(&src);
    copy_tree(&src, &dst, &matcher)
}

fn copy_tree(src: &Path, dst: &Path, matcher: &IgnoreMatcher) -> Result<()> {
    fs::create_dir_all(dst).with_context(|| format!("creating {}", dst.display()))?;
    let walker = WalkDir::new(src)
        .min_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !matcher.is_ignored_os(e.file_name()));
    for entry in walker {
        let entry = entry?;
        let rel = entry.path().strip_prefix(src)?;
        let out = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&out).with_context(|| format!("creating {}", out.display()))?;
        } else {
            fs::copy(entry.path(), &out)
                .with_context(|| format!("copying {}", entry.path().display()))?;
        }
    }
    Ok(())
}

fn check_single_component(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => bail!("invalid skill name: {name:?}"),
    }
}

/// Runs `f` on the server map of `data`, creating the map when absent.
/// Key order of the surrounding document is kept.
fn update_servers(data: &mut Value, f: impl FnOnce(&mut Map<String, Value>)) {
    let mut doc = match data.take() {
        Value::Object(doc) => doc,
        _ => Map::new(),
    };
    let servers = doc
        .entry(MCP_SERVERS_KEY)
        .or_insert_with(|| Value::Object(Map::new()));
    if !servers.is_object() {
        tracing::warn!("replacing non-object \"{MCP_SERVERS_KEY}\" value");
        *servers = Value::Object(Map::new());
    }
    if let Value::Object(servers) = servers {
        f(servers);
    }
    *data = Value::Object(doc);
}

/// Removes the named servers from `data`; absent keys are ignored.
pub fn delete_mcp_servers<S: AsRef<str>>(data: &mut Value, keys: &[S]) {
    update_servers(data, |servers| {
        for key in keys {
            servers.shift_remove(key.as_ref());
        }
    });
}

/// Copies the named servers from the current content of `source_file` into
/// `data`. Keys missing from the source are skipped.
pub fn import_mcp_servers<S: AsRef<str>>(
    data: &mut Value,
    source_file: &Path,
    keys: &[S],
) -> std::result::Result<(), JsoncError> {
    let source = load_jsonc(source_file)?;
    let empty = Map::new();
    let source_servers = server_map(&source).unwrap_or(&empty);
    update_servers(data, |servers| {
        for key in keys {
            let key = key.as_ref();
            if let Some(value) = source_servers.get(key) {
                servers.insert(key.to_string(), value.clone());
            }
        }
    });
    Ok(())
}

/// Overwrites `target_file` with `data` as 2-space pretty JSON.
pub fn save_mcp_target(target_file: &Path, data: &Value) -> std::io::Result<()> {
    let text = serde_json::to_string_pretty(data).map_err(std::io::Error::other)?;
    fs::write(target_file, text)
}
