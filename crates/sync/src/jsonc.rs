//! Loader for JSON with `//` and `/* */` comments.

use crate::error::JsoncError;
use regex::{Captures, Regex};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// Matches a comment or a complete string literal. String literals are
/// matched so that comment-like text inside them is left alone.
static COMMENT_OR_STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?ms)//.*?$|/\*.*?\*/|'(?:\\.|[^\\'])*'|"(?:\\.|[^\\"])*""#)
        .expect("COMMENT_OR_STRING: compile-time constant")
});

/// Removes line and block comments from `text`, keeping string literals verbatim.
pub fn strip_comments(text: &str) -> String {
    COMMENT_OR_STRING
        .replace_all(text, |caps: &Captures<'_>| {
            let matched = &caps[0];
            if matched.starts_with('/') {
                String::new()
            } else {
                matched.to_string()
            }
        })
        .into_owned()
}

/// Parses JSON-with-comments text.
pub fn parse_jsonc(text: &str) -> serde_json::Result<Value> {
    serde_json::from_str(&strip_comments(text))
}

/// Reads and parses the JSON-with-comments file at `path`.
pub fn load_jsonc(path: &Path) -> Result<Value, JsoncError> {
    let text = fs::read_to_string(path).map_err(|source| JsoncError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_jsonc(&text).map_err(|source| JsoncError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
