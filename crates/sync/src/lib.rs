//! Compare and sync engine for skill directories and MCP server entries.
//!
//! A *skill* is a directory holding a `SKILL.md`; an *MCP server entry* is a
//! named JSON object under the `mcpServers` map of a JSON-with-comments file.
//! This crate decides whether each source item is new, identical or
//! divergent relative to a target, and performs the import/delete actions
//! that follow from that.
//!
//! Everything is a pure function of on-disk state: nothing is cached and no
//! global configuration is read. Callers pass the source and target paths
//! explicitly.
//!
//! # Examples
//!
//! ```
//! use skillbridge_sync::{build_skills_rows, import_skills_to_target, SkillSelection, SyncStatus};
//! use std::fs;
//!
//! let skills = tempfile::tempdir().unwrap();
//! let target = tempfile::tempdir().unwrap();
//! fs::create_dir_all(skills.path().join("docs/pdf")).unwrap();
//! fs::write(skills.path().join("docs/pdf/SKILL.md"), "description: PDFs").unwrap();
//!
//! let rows = build_skills_rows(skills.path(), target.path()).unwrap();
//! assert_eq!(rows[0].status, SyncStatus::New);
//!
//! let selected: Vec<SkillSelection> = rows.iter().map(SkillSelection::from).collect();
//! assert!(import_skills_to_target(skills.path(), target.path(), &selected).is_empty());
//!
//! let rows = build_skills_rows(skills.path(), target.path()).unwrap();
//! assert_eq!(rows[0].status, SyncStatus::Identical);
//! assert!(target.path().join("pdf/SKILL.md").exists());
//! ```

#![deny(unsafe_code)]

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

pub mod actions;
pub mod descriptor;
pub mod diff;
pub mod error;
pub mod github;
pub mod hash;
pub mod ignore;
pub mod jsonc;
pub mod mcp;
pub mod report;
pub mod skills;
mod walk;

pub use actions::{
    delete_mcp_servers, delete_skill_dirs, import_mcp_servers, import_skills_to_target,
    save_mcp_target, SkillSelection,
};
pub use descriptor::{get_skill_description, Description, DESCRIPTOR_FILE};
pub use diff::{
    collect_diff_files, file_text_diff, files_are_different, is_text_file, mcp_value_diff,
    text_diff, DiffFileEntry, DiffKind,
};
pub use error::{CompareError, JsoncError, UrlParseError};
pub use github::{
    get_install_final_output_dir, parse_github_tree_url, parse_legacy_tree_url, InstallTarget,
};
pub use hash::{calculate_dir_hash, calculate_dir_hash_detailed, DirDigest};
pub use ignore::{get_ignore_patterns, IgnoreMatcher, IGNORE_FILE};
pub use jsonc::{load_jsonc, parse_jsonc, strip_comments};
pub use mcp::{
    build_mcp_rows, load_mcp_target, read_mcp_current_data, server_map, McpRow, MCP_SERVERS_KEY,
};
pub use report::{BatchFailure, SyncStatus};
pub use skills::{
    build_skills_rows, collect_source_skill_rel_paths, collect_target_skill_dirs, SkillEntry,
    SkillRow,
};
