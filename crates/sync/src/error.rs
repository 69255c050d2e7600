//! Error types surfaced by the compare and action layers.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to load a JSON-with-comments document.
#[derive(Debug, Error)]
pub enum JsoncError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of a comparison entry point.
///
/// The `Display` text is what a caller shows in place of the comparison list.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("skills source directory does not exist: {}", .0.display())]
    MissingSkillsRoot(PathBuf),
    #[error("MCP source file does not exist: {}", .0.display())]
    MissingMcpSource(PathBuf),
    #[error("malformed source {}: {message}", path.display())]
    MalformedSource { path: PathBuf, message: String },
    #[error("refusing to modify malformed target {}: {message}", path.display())]
    MalformedTarget { path: PathBuf, message: String },
}

impl CompareError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::MalformedSource {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn malformed_target(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::MalformedTarget {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Why a GitHub tree URL could not be turned into an install target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UrlParseError {
    #[error("not a GitHub URL")]
    NotGithub,
    #[error("could not parse GitHub URL; expected github.com/<owner>/<repo>/tree/<branch>/<path>")]
    ParseFailed,
}

impl UrlParseError {
    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            Self::NotGithub => "not_github",
            Self::ParseFailed => "parse_failed",
        }
    }
}
