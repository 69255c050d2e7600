use anyhow::Result;
use std::path::PathBuf;

/// Directory name under the user's home that holds skillbridge data.
const DATA_DIR_NAME: &str = ".skillbridge";

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Returns the user's home directory.
pub fn home_dir() -> Result<PathBuf> {
    #[cfg(unix)]
    if let Ok(home) = std::env::var("HOME") {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir().ok_or_else(|| anyhow::anyhow!("home directory not found"))
}

/// Returns the data root, `SKILLBRIDGE_HOME` or `~/.skillbridge`.
pub fn data_root() -> Result<PathBuf> {
    if let Some(custom) = env_path("SKILLBRIDGE_HOME") {
        return Ok(custom);
    }
    Ok(home_dir()?.join(DATA_DIR_NAME))
}

/// Returns the path to the configuration file.
///
/// `SKILLBRIDGE_CONFIG` wins; otherwise `<config_dir>/skillbridge/config.json`,
/// falling back to the data root on platforms without a config dir.
pub fn config_file() -> Result<PathBuf> {
    if let Some(custom) = env_path("SKILLBRIDGE_CONFIG") {
        return Ok(custom);
    }
    match dirs::config_dir() {
        Some(dir) => Ok(dir.join("skillbridge").join("config.json")),
        None => Ok(data_root()?.join("config.json")),
    }
}

/// Returns the path to the history file.
pub fn history_file() -> Result<PathBuf> {
    if let Some(custom) = env_path("SKILLBRIDGE_HISTORY") {
        return Ok(custom);
    }
    Ok(data_root()?.join("history.json"))
}

/// Returns the skills directory from `SKILLBRIDGE_SKILLS_DIR`, if set.
pub fn skills_dir_override() -> Option<PathBuf> {
    env_path("SKILLBRIDGE_SKILLS_DIR")
}

/// Returns the MCP settings file from `SKILLBRIDGE_MCP_FILE`, if set.
pub fn mcp_file_override() -> Option<PathBuf> {
    env_path("SKILLBRIDGE_MCP_FILE")
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillbridge_test_utils::{env_guard, set_env_var};

    #[test]
    fn data_root_honors_override() {
        let _g = env_guard();
        let _home = set_env_var("SKILLBRIDGE_HOME", Some("/tmp/sb-home"));
        assert_eq!(data_root().unwrap(), PathBuf::from("/tmp/sb-home"));
        let _hist = set_env_var("SKILLBRIDGE_HISTORY", None);
        assert_eq!(
            history_file().unwrap(),
            PathBuf::from("/tmp/sb-home/history.json")
        );
    }

    #[test]
    fn empty_override_is_ignored() {
        let _g = env_guard();
        let _home = set_env_var("SKILLBRIDGE_HOME", Some(""));
        let _real = set_env_var("HOME", Some("/tmp/sb-user"));
        let _skills = set_env_var("SKILLBRIDGE_SKILLS_DIR", Some(""));
        #[cfg(unix)]
        assert_eq!(data_root().unwrap(), PathBuf::from("/tmp/sb-user/.skillbridge"));
        assert!(skills_dir_override().is_none());
    }

    #[test]
    fn config_file_honors_override() {
        let _g = env_guard();
        let _cfg = set_env_var("SKILLBRIDGE_CONFIG", Some("/tmp/sb/config.json"));
        assert_eq!(config_file().unwrap(), PathBuf::from("/tmp/sb/config.json"));
    }

    #[test]
    fn path_overrides_read_env() {
        let _g = env_guard();
        let _skills = set_env_var("SKILLBRIDGE_SKILLS_DIR", Some("/srv/skills"));
        let _mcp = set_env_var("SKILLBRIDGE_MCP_FILE", None);
        assert_eq!(skills_dir_override(), Some(PathBuf::from("/srv/skills")));
        assert_eq!(mcp_file_override(), None);
    }
}
