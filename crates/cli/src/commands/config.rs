//! Handlers for `skillbridge config ...`.

use anyhow::{bail, Result};
use serde_json::json;
use skillbridge_state::{config_file, AppConfig};

use super::print_json;
use crate::cli::{ConfigCommand, OutputFormat};

pub(crate) fn handle_config_command(command: ConfigCommand, format: OutputFormat) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let config = AppConfig::load()?;
            let file = config_file()?;
            if format.is_json() {
                return print_json(&json!({ "config_file": file, "config": config }));
            }
            println!("config file:       {}", file.display());
            println!("skills_dir:        {}", config.skills_dir.display());
            println!("mcp_settings_file: {}", config.mcp_settings_file.display());
            Ok(())
        }
        ConfigCommand::Set {
            skills_dir,
            mcp_file,
        } => {
            if skills_dir.is_none() && mcp_file.is_none() {
                bail!("nothing to set; pass --skills-dir and/or --mcp-file");
            }
            let mut config = AppConfig::load_file()?;
            if let Some(dir) = skills_dir {
                config.skills_dir = dir;
            }
            if let Some(file) = mcp_file {
                config.mcp_settings_file = file;
            }
            config.save()?;
            if format.is_json() {
                return print_json(&config);
            }
            println!("Saved configuration to {}", config_file()?.display());
            Ok(())
        }
    }
}
