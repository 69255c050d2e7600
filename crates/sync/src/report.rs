//! Status and outcome types shared by the compare and action layers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative state of a source item against the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Absent from the target.
    New,
    /// Present in the target with identical content.
    Identical,
    /// Present in the target with different content.
    Divergent,
}

impl SyncStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Identical => "identical",
            Self::Divergent => "divergent",
        }
    }

    pub fn is_divergent(self) -> bool {
        self == Self::Divergent
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single failed item in a batch action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    /// The key or name the caller passed in.
    pub name: String,
    pub error: String,
}

impl BatchFailure {
    pub(crate) fn new(name: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            name: name.into(),
            error: error.to_string(),
        }
    }
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SyncStatus::Divergent).unwrap(),
            "\"divergent\""
        );
        assert_eq!(SyncStatus::New.to_string(), "new");
        assert!(!SyncStatus::Identical.is_divergent());
    }

    #[test]
    fn failure_display_names_the_item() {
        let failure = BatchFailure::new("s1", "permission denied");
        assert_eq!(failure.to_string(), "s1: permission denied");
    }
}
