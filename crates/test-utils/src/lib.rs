//! Shared test utilities for skillbridge crates.
//!
//! This crate provides common test fixtures and utilities used across
//! multiple crates in the skillbridge workspace.

use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

/// Serialize tests that mutate process-global state (env vars, cwd, etc).
///
/// Acquire this guard at the start of any test that modifies environment
/// variables to prevent race conditions between parallel tests.
pub fn env_guard() -> MutexGuard<'static, ()> {
    static TEST_SERIAL: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// RAII guard for environment variables - restores original value on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        if let Some(v) = &self.previous {
            std::env::set_var(self.key, v);
        } else {
            std::env::remove_var(self.key);
        }
    }
}

/// Set an environment variable and return a guard that restores the original on drop.
///
/// # Example
/// ```
/// let _guard = skillbridge_test_utils::set_env_var("MY_VAR", Some("value"));
/// // MY_VAR is set to "value"
/// // When _guard drops, MY_VAR is restored to its original value
/// ```
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    if let Some(val) = value {
        std::env::set_var(key, val);
    } else {
        std::env::remove_var(key);
    }
    EnvVarGuard { key, previous }
}

/// Writes `content` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) -> std::io::Result<PathBuf> {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, content)?;
    Ok(path)
}

/// A source skills root and a target root inside one tempdir.
///
/// The tempdir is automatically cleaned up when this struct is dropped.
pub struct SkillTreeFixture {
    pub tempdir: tempfile::TempDir,
    /// Source root, `<tmp>/skills`.
    pub skills_root: PathBuf,
    /// Flat target root, `<tmp>/target`.
    pub target_root: PathBuf,
}

impl SkillTreeFixture {
    /// Creates both roots (empty).
    pub fn new() -> std::io::Result<Self> {
        let tempdir = tempfile::tempdir()?;
        let skills_root = tempdir.path().join("skills");
        let target_root = tempdir.path().join("target");
        std::fs::create_dir_all(&skills_root)?;
        std::fs::create_dir_all(&target_root)?;
        Ok(Self {
            tempdir,
            skills_root,
            target_root,
        })
    }

    /// Creates a source skill at `rel_path` with a descriptor plus `files`.
    pub fn create_skill(&self, rel_path: &str, files: &[(&str, &str)]) -> std::io::Result<PathBuf> {
        let dir = self.skills_root.join(rel_path);
        let description = format!(
            "---\nname: {}\ndescription: Test skill {rel_path}\n---\n",
            rel_path.rsplit('/').next().unwrap_or(rel_path)
        );
        write_file(&dir, "SKILL.md", &description)?;
        for (rel, content) in files {
            write_file(&dir, rel, content)?;
        }
        Ok(dir)
    }

    /// Writes a file under the target root.
    pub fn write_target(&self, rel: &str, content: &str) -> std::io::Result<PathBuf> {
        write_file(&self.target_root, rel, content)
    }

    /// Writes an MCP settings document with the given server map.
    pub fn write_mcp(&self, name: &str, servers: serde_json::Value) -> std::io::Result<PathBuf> {
        let doc = serde_json::json!({ "mcpServers": servers });
        let text = serde_json::to_string_pretty(&doc).map_err(std::io::Error::other)?;
        write_file(self.tempdir.path(), name, &text)
    }
}
