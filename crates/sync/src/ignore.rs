//! Ignore-pattern resolution.
//!
//! A skill directory may carry a `.gitignore`. Only bare names are honoured:
//! each pattern is matched against the *name* of a child entry at every level
//! of a walk, never against a path. Shell wildcards (`*`, `?`, `[...]`) are
//! accepted and likewise apply to the bare name only.

use glob::{MatchOptions, Pattern};
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

/// Name of the per-directory ignore file.
pub const IGNORE_FILE: &str = ".gitignore";

/// Reads the ignore list of `dir`.
///
/// Comments and blank lines are dropped and a trailing `/` is stripped.
/// A missing or unreadable file yields an empty list.
pub fn get_ignore_patterns(dir: &Path) -> Vec<String> {
    let path = dir.join(IGNORE_FILE);
    if !path.exists() {
        return Vec::new();
    }
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "ignore file unreadable, using no patterns");
            return Vec::new();
        }
    };
    parse_ignore_patterns(&content)
}

/// Parses ignore-file content into bare name patterns.
pub fn parse_ignore_patterns(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.strip_suffix('/').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone)]
enum NamePattern {
    Literal(String),
    Glob(Pattern),
}

impl NamePattern {
    fn new(raw: &str) -> Self {
        if raw.contains(['*', '?', '[']) {
            if let Ok(pattern) = Pattern::new(raw) {
                return Self::Glob(pattern);
            }
        }
        Self::Literal(raw.to_string())
    }

    fn matches(&self, name: &str) -> bool {
        const OPTIONS: MatchOptions = MatchOptions {
            case_sensitive: true,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        match self {
            Self::Literal(lit) => lit == name,
            Self::Glob(pattern) => pattern.matches_with(name, OPTIONS),
        }
    }
}

/// Predicate over child names, built from an ignore list.
#[derive(Debug, Clone, Default)]
pub struct IgnoreMatcher {
    patterns: Vec<NamePattern>,
}

impl IgnoreMatcher {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| NamePattern::new(p.as_ref()))
                .collect(),
        }
    }

    /// Builds the matcher from `dir`'s own ignore file.
    pub fn from_dir(dir: &Path) -> Self {
        Self::new(get_ignore_patterns(dir))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True when `name` (a bare entry name) matches any pattern.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(name))
    }

    pub(crate) fn is_ignored_os(&self, name: &OsStr) -> bool {
        !self.is_empty() && self.is_ignored(&name.to_string_lossy())
    }

    /// Returns the subset of `names` to exclude at one directory level.
    pub fn excluded<'a, I>(&self, names: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names.into_iter().filter(|n| self.is_ignored(n)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_names_and_strips_trailing_slash() {
        let patterns = parse_ignore_patterns("# comment\n\nbuild/\n  node_modules/  \n*.pyc\n/\n");
        assert_eq!(patterns, vec!["build", "node_modules", "*.pyc"]);
    }

    #[test]
    fn missing_ignore_file_yields_empty_list() {
        let dir = TempDir::new().unwrap();
        assert!(get_ignore_patterns(dir.path()).is_empty());
    }

    #[test]
    fn reads_ignore_file_from_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(IGNORE_FILE), "ignored_dir\nignored.txt\n").unwrap();
        assert_eq!(
            get_ignore_patterns(dir.path()),
            vec!["ignored_dir", "ignored.txt"]
        );
    }

    #[test]
    fn matching_is_by_bare_name() {
        let matcher = IgnoreMatcher::new(["build", "*.log"]);
        assert!(matcher.is_ignored("build"));
        assert!(matcher.is_ignored("debug.log"));
        assert!(!matcher.is_ignored("builds"));
        assert!(!matcher.is_ignored("src/build"));
        assert_eq!(
            matcher.excluded(["build", "src", "a.log", "a.txt"]),
            vec!["build", "a.log"]
        );
    }

    #[test]
    fn invalid_glob_falls_back_to_literal() {
        let matcher = IgnoreMatcher::new(["[oops"]);
        assert!(matcher.is_ignored("[oops"));
        assert!(!matcher.is_ignored("o"));
    }
}
