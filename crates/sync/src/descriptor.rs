//! Read-only access to `SKILL.md` descriptors.

use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// File whose presence marks a directory as a skill.
pub const DESCRIPTOR_FILE: &str = "SKILL.md";

static FRONTMATTER_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+:").expect("valid regex"));

/// Outcome of reading a skill's description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Description {
    Found(String),
    MissingDescriptor,
    MissingField,
    ReadError(String),
}

impl Description {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Found(text) => Some(text),
            _ => None,
        }
    }
}

/// Reads the `description:` value from `skill_dir/SKILL.md`.
pub fn get_skill_description(skill_dir: &Path) -> Description {
    let path = skill_dir.join(DESCRIPTOR_FILE);
    if !path.exists() {
        return Description::MissingDescriptor;
    }
    match fs::read_to_string(&path) {
        Ok(content) => match parse_description(&content) {
            Some(text) => Description::Found(text),
            None => Description::MissingField,
        },
        Err(err) => Description::ReadError(err.to_string()),
    }
}

/// Extracts the description from descriptor text.
///
/// The value starts on the `description:` line and continues over following
/// lines until a `---` line, another `key:` line or the end of input.
pub fn parse_description(content: &str) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    let mut in_desc = false;

    for line in content.split('\n') {
        let stripped = line.trim();
        if in_desc && stripped == "---" {
            break;
        }
        if let Some(rest) = stripped.strip_prefix("description:") {
            in_desc = true;
            let value = unquote(rest.trim());
            if !value.is_empty() {
                parts.push(value.to_string());
            }
            continue;
        }
        if in_desc {
            if stripped.is_empty() {
                continue;
            }
            if FRONTMATTER_KEY.is_match(line) {
                break;
            }
            parts.push(stripped.to_string());
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
