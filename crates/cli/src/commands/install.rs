//! Handler for `skillbridge install`.

use anyhow::{Context, Result};
use serde_json::json;
use skillbridge_fetch::{GitHubDownloader, StopFlag};
use skillbridge_sync::{get_install_final_output_dir, parse_github_tree_url};
use std::path::PathBuf;

use super::{print_json, remember_skills_dir};
use crate::cli::OutputFormat;

pub(crate) fn handle_install_command(
    url: String,
    target: PathBuf,
    dry_run: bool,
    format: OutputFormat,
) -> Result<()> {
    // The preview uses the strict parser; a failed preview does not block
    // the download, which uses the lenient one.
    let predicted = get_install_final_output_dir(&url, &target);
    let preview_error = parse_github_tree_url(&url).err();

    if dry_run {
        if format.is_json() {
            return print_json(&json!({
                "url": url,
                "destination": predicted,
                "error": preview_error.map(|e| e.code()),
            }));
        }
        match (&predicted, preview_error) {
            (Some(dir), _) => println!("Would install to {}", dir.display()),
            (None, Some(err)) => println!("Cannot predict destination: {err}"),
            (None, None) => println!("Cannot predict destination: URL names no folder"),
        }
        return Ok(());
    }

    if !format.is_json() {
        if let Some(dir) = &predicted {
            println!("Installing to {}", dir.display());
        }
    }

    let stop = StopFlag::new();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let quiet = format.is_json();
    let report = runtime.block_on(async {
        let watcher = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, stopping after the current file");
                watcher.stop();
            }
        });
        GitHubDownloader::new(stop.clone())
            .on_progress(move |event| {
                if !quiet {
                    eprintln!("{event}");
                }
            })
            .download(&url, &target)
            .await
    })?;
    remember_skills_dir(&target);

    if format.is_json() {
        return print_json(&report);
    }
    if report.stopped {
        println!("Stopped.");
    }
    println!(
        "Installed {} skill(s), {} file(s), {} failure(s)",
        report.skills.len(),
        report.files,
        report.failures
    );
    for dir in &report.skills {
        println!("  {}", dir.display());
    }
    Ok(())
}
