//! Handlers for `skillbridge mcp ...`.

use anyhow::{anyhow, bail, Context, Result};
use serde_json::json;
use skillbridge_state::AppConfig;
use skillbridge_sync::{
    build_mcp_rows, delete_mcp_servers, import_mcp_servers, load_mcp_target, mcp_value_diff,
    read_mcp_current_data, save_mcp_target, McpRow, SyncStatus,
};
use std::path::{Path, PathBuf};

use super::{confirm, print_json, remember_mcp_file};
use crate::cli::{McpCommand, McpPaths, OutputFormat, Selection};

pub(crate) fn handle_mcp_command(command: McpCommand, format: OutputFormat) -> Result<()> {
    match command {
        McpCommand::Status { paths } => handle_status(paths, format),
        McpCommand::Import {
            paths,
            keys,
            selection,
        } => handle_import(paths, keys, selection, format),
        McpCommand::Delete { target, keys, yes } => handle_delete(target, keys, yes, format),
        McpCommand::Diff { paths, key } => handle_diff(paths, key, format),
    }
}

fn source_file(source: Option<PathBuf>) -> Result<PathBuf> {
    match source {
        Some(file) => Ok(file),
        None => Ok(AppConfig::load()?.mcp_settings_file),
    }
}

fn load_rows(paths: &McpPaths) -> Result<(PathBuf, Vec<String>, Vec<McpRow>)> {
    let source = source_file(paths.source.clone())?;
    let (data, target_keys) = read_mcp_current_data(&paths.target);
    let rows = build_mcp_rows(&source, &data)?;
    Ok((source, target_keys, rows))
}

fn write_target(target: &Path, data: &serde_json::Value) -> Result<()> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    save_mcp_target(target, data).with_context(|| format!("writing {}", target.display()))
}

fn handle_status(paths: McpPaths, format: OutputFormat) -> Result<()> {
    let (source, target_keys, rows) = load_rows(&paths)?;
    let target_only: Vec<&String> = target_keys
        .iter()
        .filter(|k| rows.iter().all(|r| &r.key != *k))
        .collect();
    remember_mcp_file(&paths.target);

    if format.is_json() {
        return print_json(&json!({
            "source": source,
            "target": paths.target,
            "servers": rows,
            "target_only": target_only,
        }));
    }

    if rows.is_empty() {
        println!("No MCP servers in {}", source.display());
    }
    for row in &rows {
        println!("{:<10} {}", row.status.label(), row.key);
    }
    for key in target_only {
        println!("{:<10} {}", "target", key);
    }
    Ok(())
}

fn handle_import(
    paths: McpPaths,
    keys: Vec<String>,
    selection: Selection,
    format: OutputFormat,
) -> Result<()> {
    let source = source_file(paths.source.clone())?;
    let mut data = load_mcp_target(&paths.target)?;
    let rows = build_mcp_rows(&source, &data)?;
    let chosen: Vec<String> = if selection.all || selection.all_new {
        rows.iter()
            .filter(|r| selection.all || r.status == SyncStatus::New)
            .map(|r| r.key.clone())
            .collect()
    } else {
        if keys.is_empty() {
            bail!("no servers selected; pass keys, --all-new or --all");
        }
        if let Some(missing) = keys.iter().find(|k| rows.iter().all(|r| &r.key != *k)) {
            bail!("server '{missing}' not found in {}", source.display());
        }
        keys
    };

    if chosen.is_empty() {
        if format.is_json() {
            return print_json(&json!({ "imported": chosen }));
        }
        println!("Nothing to import.");
        return Ok(());
    }

    import_mcp_servers(&mut data, &source, &chosen)?;
    write_target(&paths.target, &data)?;
    remember_mcp_file(&paths.target);

    if format.is_json() {
        print_json(&json!({ "imported": chosen }))
    } else {
        for key in &chosen {
            println!("imported {key}");
        }
        Ok(())
    }
}

fn handle_delete(target: PathBuf, keys: Vec<String>, yes: bool, format: OutputFormat) -> Result<()> {
    if !target.exists() {
        bail!("target file does not exist: {}", target.display());
    }
    let mut data = load_mcp_target(&target)?;
    let prompt = format!(
        "Delete {} server(s) from {}? ({})",
        keys.len(),
        target.display(),
        keys.join(", ")
    );
    if !confirm(&prompt, yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    delete_mcp_servers(&mut data, &keys);
    write_target(&target, &data)?;
    remember_mcp_file(&target);

    if format.is_json() {
        print_json(&json!({ "deleted": keys }))
    } else {
        for key in &keys {
            println!("deleted {key}");
        }
        Ok(())
    }
}

fn handle_diff(paths: McpPaths, key: String, format: OutputFormat) -> Result<()> {
    let (_, _, rows) = load_rows(&paths)?;
    let row = rows
        .iter()
        .find(|r| r.key == key)
        .ok_or_else(|| anyhow!("server '{key}' not found in source"))?;
    let diff = mcp_value_diff(&row.source_value, &row.target_value);

    if format.is_json() {
        return print_json(&json!({
            "key": row.key,
            "status": row.status,
            "source": row.source_value,
            "target": row.target_value,
            "diff": diff,
        }));
    }
    println!("{} ({})", row.key, row.status);
    if row.status == SyncStatus::Identical {
        println!("  no differences");
    } else {
        print!("{diff}");
    }
    Ok(())
}
