//! Handlers for `skillbridge history`.

use anyhow::Result;
use serde_json::json;
use skillbridge_state::HistoryStore;

use super::print_json;
use crate::cli::{HistoryCommand, OutputFormat};

pub(crate) fn handle_history_command(
    action: Option<HistoryCommand>,
    clear_missing: bool,
    format: OutputFormat,
) -> Result<()> {
    let mut history = HistoryStore::open_default()?;

    if let Some(HistoryCommand::Remove { path }) = action {
        let removed = history.remove_everywhere(&path);
        if format.is_json() {
            return print_json(&json!({ "path": path, "removed": removed }));
        }
        if removed {
            println!("Removed {}", path.display());
        } else {
            println!("{} was not in history", path.display());
        }
        return Ok(());
    }

    if clear_missing {
        let dropped = history.clear_missing();
        if !format.is_json() && dropped > 0 {
            println!("Dropped {dropped} missing path(s)");
        }
    }

    let items = history.all_history();
    if format.is_json() {
        return print_json(&items);
    }
    if items.is_empty() {
        println!("(no history)");
        return Ok(());
    }
    for entry in items {
        println!(
            "{:.0} | {:<5} | {}",
            entry.item.time,
            entry.kind.label(),
            entry.item.path.display()
        );
    }
    Ok(())
}
