//! Library half of the `skillbridge` binary.
//!
//! Parses the command line and dispatches to the handlers in [`commands`],
//! which drive the compare and action APIs of `skillbridge_sync`, the
//! downloader of `skillbridge_fetch` and the stores of `skillbridge_state`.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

pub use cli::{Cli, Commands, OutputFormat};

/// The main entry point for the `skillbridge` application.
pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    dispatch(cli)
}

fn dispatch(cli: Cli) -> Result<()> {
    let format = cli.format;
    match cli.command {
        Commands::Skills(command) => commands::handle_skills_command(command, format),
        Commands::Mcp(command) => commands::handle_mcp_command(command, format),
        Commands::Install {
            url,
            target,
            dry_run,
        } => commands::handle_install_command(url, target, dry_run, format),
        Commands::Config(command) => commands::handle_config_command(command, format),
        Commands::History {
            action,
            clear_missing,
        } => commands::handle_history_command(action, clear_missing, format),
    }
}
