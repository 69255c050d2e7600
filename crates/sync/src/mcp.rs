//! Comparison of MCP server entries between two JSON-with-comments files.

use crate::error::CompareError;
use crate::jsonc::load_jsonc;
use crate::report::SyncStatus;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::path::Path;

/// Top-level key holding the server map.
pub const MCP_SERVERS_KEY: &str = "mcpServers";

/// One line of the MCP comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpRow {
    pub key: String,
    pub status: SyncStatus,
    pub has_divergence: bool,
    pub source_value: Value,
    /// The target's value, or an empty object when absent.
    pub target_value: Value,
}

/// The server map of a loaded document, if it has one.
pub fn server_map(data: &Value) -> Option<&Map<String, Value>> {
    data.get(MCP_SERVERS_KEY)?.as_object()
}

/// Loads the target document for display.
///
/// A missing or malformed file, or one without a usable server map, reads as
/// an empty document. Returns the document and its sorted server keys.
pub fn read_mcp_current_data(target_file: &Path) -> (Value, Vec<String>) {
    let empty = || (Value::Object(Map::new()), Vec::new());
    if !target_file.exists() {
        return empty();
    }
    let data = match load_jsonc(target_file) {
        Ok(data) => data,
        Err(err) => {
            tracing::debug!(error = %err, "target MCP file unreadable, treating as empty");
            return empty();
        }
    };
    if !data.is_object() {
        return empty();
    }
    let keys = match data.get(MCP_SERVERS_KEY) {
        None => Vec::new(),
        Some(Value::Object(servers)) => sorted_keys(servers),
        Some(_) => return empty(),
    };
    (data, keys)
}

/// Loads the target document for a load-mutate-save cycle.
///
/// A missing file is an empty document. A file that does not parse, is not
/// an object, or has a non-object server map is an error, so the caller never
/// overwrites content it could not read.
pub fn load_mcp_target(target_file: &Path) -> Result<Value, CompareError> {
    if !target_file.exists() {
        return Ok(Value::Object(Map::new()));
    }
    let data =
        load_jsonc(target_file).map_err(|e| CompareError::malformed_target(target_file, e))?;
    if !data.is_object() {
        return Err(CompareError::malformed_target(
            target_file,
            "top-level value is not an object",
        ));
    }
    match data.get(MCP_SERVERS_KEY) {
        None | Some(Value::Object(_)) => Ok(data),
        Some(_) => Err(CompareError::malformed_target(
            target_file,
            format!("\"{MCP_SERVERS_KEY}\" is not an object"),
        )),
    }
}

/// Classifies every server in `source_file` against `current_data`.
pub fn build_mcp_rows(source_file: &Path, current_data: &Value) -> Result<Vec<McpRow>, CompareError> {
    if !source_file.exists() {
        return Err(CompareError::MissingMcpSource(source_file.to_path_buf()));
    }
    let source = load_jsonc(source_file).map_err(|e| CompareError::malformed(source_file, e))?;
    let source_servers = match &source {
        Value::Object(doc) => match doc.get(MCP_SERVERS_KEY) {
            None => Map::new(),
            Some(Value::Object(servers)) => servers.clone(),
            Some(_) => {
                return Err(CompareError::malformed(
                    source_file,
                    format!("\"{MCP_SERVERS_KEY}\" is not an object"),
                ))
            }
        },
        _ => {
            return Err(CompareError::malformed(
                source_file,
                "top-level value is not an object",
            ))
        }
    };
    let empty = Map::new();
    let target_servers = server_map(current_data).unwrap_or(&empty);

    let rows = sorted_keys(&source_servers)
        .into_iter()
        .map(|key| {
            let source_value = source_servers[&key].clone();
            let (status, target_value) = match target_servers.get(&key) {
                None => (SyncStatus::New, Value::Object(Map::new())),
                Some(target) if values_equal(target, &source_value) => {
                    (SyncStatus::Identical, target.clone())
                }
                Some(target) => (SyncStatus::Divergent, target.clone()),
            };
            McpRow {
                key,
                status,
                has_divergence: status.is_divergent(),
                source_value,
                target_value,
            }
        })
        .collect();
    Ok(rows)
}

/// Deep equality where numbers compare by value, so `1` equals `1.0`.
/// Object key order is irrelevant.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
        return x == y;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn sorted_keys(map: &Map<String, Value>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort();
    keys
}
