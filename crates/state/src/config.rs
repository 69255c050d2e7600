//! Persistent application configuration.

use crate::env::{config_file, data_root, mcp_file_override, skills_dir_override};
use crate::persistence::write_json_atomic;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The two configured locations: the source skills root and the source MCP
/// settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub skills_dir: PathBuf,
    pub mcp_settings_file: PathBuf,
}

/// On-disk shape; either field may be absent.
#[derive(Debug, Default, Deserialize)]
struct StoredConfig {
    #[serde(default)]
    skills_dir: Option<PathBuf>,
    #[serde(default)]
    mcp_settings_file: Option<PathBuf>,
}

impl AppConfig {
    /// Default locations under `root`.
    pub fn with_root(root: &Path) -> Self {
        Self {
            skills_dir: root.join("skills"),
            mcp_settings_file: root.join("mcp").join("settings.json"),
        }
    }

    /// Default locations under the data root.
    pub fn defaults() -> Result<Self> {
        Ok(Self::with_root(&data_root()?))
    }

    /// Overlays `path` on `base`. A missing or unparsable file leaves `base`
    /// untouched.
    pub fn load_from(path: &Path, base: Self) -> Self {
        let Ok(text) = std::fs::read_to_string(path) else {
            return base;
        };
        match serde_json::from_str::<StoredConfig>(&text) {
            Ok(stored) => Self {
                skills_dir: stored.skills_dir.unwrap_or(base.skills_dir),
                mcp_settings_file: stored.mcp_settings_file.unwrap_or(base.mcp_settings_file),
            },
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "ignoring unparsable config");
                base
            }
        }
    }

    /// Defaults overlaid with the config file, without env overrides.
    pub fn load_file() -> Result<Self> {
        Ok(Self::load_from(&config_file()?, Self::defaults()?))
    }

    /// Effective configuration: defaults, then the config file, then
    /// `SKILLBRIDGE_SKILLS_DIR` / `SKILLBRIDGE_MCP_FILE`.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        if let Some(dir) = skills_dir_override() {
            config.skills_dir = dir;
        }
        if let Some(file) = mcp_file_override() {
            config.mcp_settings_file = file;
        }
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        write_json_atomic(path, self)
    }

    /// Writes to the default config file location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_file()?)
    }
}
