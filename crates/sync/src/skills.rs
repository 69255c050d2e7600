//! Skill discovery and three-way comparison against a flat target root.
//!
//! A skill is any directory holding a `SKILL.md`. Source skills may be
//! nested (`group/name`); in the target they always live at
//! `target_root/<name>`.

use crate::descriptor::DESCRIPTOR_FILE;
use crate::error::CompareError;
use crate::hash::calculate_dir_hash;
use crate::ignore::IgnoreMatcher;
use crate::report::SyncStatus;
use crate::walk::to_posix_relative;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A source skill and where it lands in the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEntry {
    /// Last path segment.
    pub name: String,
    /// `/`-separated path relative to the skills root.
    pub rel_path: String,
    /// Leading segments, if the skill is nested.
    pub group: Option<String>,
    pub source_path: PathBuf,
    pub target_path: PathBuf,
}

impl SkillEntry {
    pub fn new(skills_root: &Path, target_root: &Path, rel_path: &str) -> Self {
        let (group, name) = match rel_path.rsplit_once('/') {
            Some((group, name)) => (Some(group.to_string()), name.to_string()),
            None => (None, rel_path.to_string()),
        };
        Self {
            source_path: skills_root.join(rel_path),
            target_path: target_root.join(&name),
            name,
            rel_path: rel_path.to_string(),
            group,
        }
    }
}

/// One line of the skills comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRow {
    #[serde(flatten)]
    pub entry: SkillEntry,
    pub status: SyncStatus,
    /// Whether a file-level diff is worth offering.
    pub has_divergence: bool,
}

/// Names of the immediate subdirectories of `target_root`.
///
/// Missing or unreadable roots yield an empty list.
pub fn collect_target_skill_dirs(target_root: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(target_root) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .flatten()
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Relative paths of every directory under `skills_root` that directly
/// contains a `SKILL.md`, sorted.
///
/// Skills nested inside other skills are reported too. A `SKILL.md` directly
/// in the root is not a skill: its relative path would be `.`, whose target
/// is the target root itself, and importing it would replace that root.
pub fn collect_source_skill_rel_paths(skills_root: &Path) -> Vec<String> {
    if !skills_root.exists() {
        return Vec::new();
    }
    let mut found = BTreeSet::new();
    for entry in WalkDir::new(skills_root)
        .min_depth(2)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_dir() || entry.file_name() != DESCRIPTOR_FILE {
            continue;
        }
        let Some(dir) = entry.path().parent() else {
            continue;
        };
        if let Some(rel) = to_posix_relative(skills_root, dir) {
            found.insert(rel);
        }
    }
    found.into_iter().collect()
}

/// Classifies every source skill as new, identical or divergent.
///
/// Both sides are hashed with the source skill's ignore rules.
pub fn build_skills_rows(
    skills_root: &Path,
    target_root: &Path,
) -> Result<Vec<SkillRow>, CompareError> {
    if !skills_root.exists() {
        return Err(CompareError::MissingSkillsRoot(skills_root.to_path_buf()));
    }

    let rows = collect_source_skill_rel_paths(skills_root)
        .iter()
        .map(|rel| {
            let entry = SkillEntry::new(skills_root, target_root, rel);
            let status = skill_status(&entry);
            SkillRow {
                entry,
                status,
                has_divergence: status.is_divergent(),
            }
        })
        .collect();
    Ok(rows)
}

fn skill_status(entry: &SkillEntry) -> SyncStatus {
    if !entry.target_path.exists() {
        return SyncStatus::New;
    }
    let matcher = IgnoreMatcher::from_dir(&entry.source_path);
    let source = calculate_dir_hash(&entry.source_path, Some(&matcher));
    let target = calculate_dir_hash(&entry.target_path, Some(&matcher));
    if source == target {
        SyncStatus::Identical
    } else {
        SyncStatus::Divergent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn target_dirs_exclude_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();
        write(dir.path(), "x.txt", "x");
        assert_eq!(collect_target_skill_dirs(dir.path()), vec!["a", "b"]);
        assert!(collect_target_skill_dirs(&dir.path().join("missing")).is_empty());
    }

    #[test]
    fn discovers_nested_and_top_level_skills() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "g1/s1/SKILL.md", "x");
        write(dir.path(), "s2/SKILL.md", "y");
        write(dir.path(), "s2/inner/SKILL.md", "z");
        write(dir.path(), "not-a-skill/readme.md", "r");
        assert_eq!(
            collect_source_skill_rel_paths(dir.path()),
            vec!["g1/s1", "s2", "s2/inner"]
        );
    }

    #[test]
    fn descriptor_in_root_is_not_a_skill() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "SKILL.md", "root");
        write(dir.path(), "s1/SKILL.md", "x");
        assert_eq!(collect_source_skill_rel_paths(dir.path()), vec!["s1"]);

        let target = TempDir::new().unwrap();
        let rows = build_skills_rows(dir.path(), target.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entry.rel_path, "s1");
    }

    #[test]
    fn entry_flattens_target_path() {
        let entry = SkillEntry::new(Path::new("/src"), Path::new("/dst"), "a/b/skill");
        assert_eq!(entry.name, "skill");
        assert_eq!(entry.group.as_deref(), Some("a/b"));
        assert_eq!(entry.target_path, Path::new("/dst/skill"));
        assert_eq!(entry.source_path, Path::new("/src/a/b/skill"));
    }

    #[test]
    fn missing_source_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = build_skills_rows(&dir.path().join("missing"), dir.path()).unwrap_err();
        assert!(matches!(err, CompareError::MissingSkillsRoot(_)));
    }

    #[test]
    fn status_moves_from_new_to_identical_to_divergent() {
        let skills = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        write(skills.path(), "g1/s1/SKILL.md", "hello");
        write(skills.path(), "g1/s1/a.txt", "a");

        let rows = build_skills_rows(skills.path(), target.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, SyncStatus::New);
        assert!(!rows[0].has_divergence);
        assert_eq!(rows[0].entry.name, "s1");
        assert_eq!(rows[0].entry.group.as_deref(), Some("g1"));
        assert_eq!(rows[0].entry.target_path, target.path().join("s1"));

        write(target.path(), "s1/SKILL.md", "hello");
        write(target.path(), "s1/a.txt", "a");
        let rows = build_skills_rows(skills.path(), target.path()).unwrap();
        assert_eq!(rows[0].status, SyncStatus::Identical);
        assert!(!rows[0].has_divergence);

        write(target.path(), "s1/a.txt", "DIFF");
        let rows = build_skills_rows(skills.path(), target.path()).unwrap();
        assert_eq!(rows[0].status, SyncStatus::Divergent);
        assert!(rows[0].has_divergence);
    }

    #[test]
    fn source_ignore_rules_apply_to_target_side() {
        let skills = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        write(skills.path(), "s1/SKILL.md", "hello");
        write(skills.path(), "s1/.gitignore", "cache/\n");
        write(skills.path(), "s1/cache/tmp.bin", "local");
        write(target.path(), "s1/SKILL.md", "hello");
        write(target.path(), "s1/.gitignore", "cache/\n");
        write(target.path(), "s1/cache/other.bin", "remote");

        let rows = build_skills_rows(skills.path(), target.path()).unwrap();
        assert_eq!(rows[0].status, SyncStatus::Identical);
    }
}
