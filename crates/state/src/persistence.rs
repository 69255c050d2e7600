//! Atomic JSON persistence shared by the config and history stores.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch as a float.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Writes `value` as pretty JSON to `path`, creating parent directories.
///
/// The content goes to a temp file in the same directory, is fsynced, then
/// renamed over `path`, so readers never observe a partial file.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let prefix = format!(
        "{}.",
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "state".to_string())
    );
    let mut tmp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, value)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

/// Name a corrupt file is moved to: `<stem>.corrupt.<ts><ext>`.
pub fn quarantine_path(path: &Path, ts: u64) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_else(|| ".json".to_string());
    path.with_file_name(format!("{stem}.corrupt.{ts}{ext}"))
}

/// Moves an unreadable state file aside. Best effort.
pub fn quarantine(path: &Path) -> Option<PathBuf> {
    let dest = quarantine_path(path, unix_now() as u64);
    match std::fs::rename(path, &dest) {
        Ok(()) => {
            tracing::warn!(from = %path.display(), to = %dest.display(), "quarantined corrupt state file");
            Some(dest)
        }
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "could not quarantine state file");
            None
        }
    }
}
