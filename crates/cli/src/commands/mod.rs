//! CLI command handlers for the skillbridge application.

mod config;
mod history;
mod install;
mod mcp;
mod skills;

pub(crate) use config::handle_config_command;
pub(crate) use history::handle_history_command;
pub(crate) use install::handle_install_command;
pub(crate) use mcp::handle_mcp_command;
pub(crate) use skills::handle_skills_command;

use anyhow::{bail, Result};
use inquire::Confirm;
use serde::Serialize;
use skillbridge_state::HistoryStore;
use skillbridge_sync::BatchFailure;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Prints `value` as pretty JSON.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Asks before a destructive action unless `yes` is set.
///
/// Without a terminal there is nobody to ask, so `--yes` is required.
pub(crate) fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        bail!("refusing to modify the target without confirmation; pass --yes");
    }
    Ok(Confirm::new(prompt).with_default(false).prompt()?)
}

/// Prints batch failures and turns them into an error when there are any.
pub(crate) fn report_failures(failures: &[BatchFailure], what: &str) -> Result<()> {
    if failures.is_empty() {
        return Ok(());
    }
    for failure in failures {
        eprintln!("error: {failure}");
    }
    bail!("{} {what} failed", failures.len())
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Records a target skills directory in the history store. Best effort.
pub(crate) fn remember_skills_dir(path: &Path) {
    match HistoryStore::open_default() {
        Ok(mut history) => history.add_skills_dir(absolute(path)),
        Err(err) => tracing::debug!(error = %err, "history unavailable"),
    }
}

/// Records a target MCP file in the history store. Best effort.
pub(crate) fn remember_mcp_file(path: &Path) {
    match HistoryStore::open_default() {
        Ok(mut history) => history.add_mcp_file(absolute(path)),
        Err(err) => tracing::debug!(error = %err, "history unavailable"),
    }
}
