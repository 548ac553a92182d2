use serde::{Deserialize, Serialize};

/// Outcome of comparing the newest capture to the one before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "diff", rename_all = "snake_case")]
pub enum ChangeVerdict {
    NoPriorCapture,
    Unchanged,
    Changed(String),
}

impl ChangeVerdict {
    /// Build a verdict from diff text; empty text means no difference.
    pub fn from_diff(diff: String) -> Self {
        if diff.is_empty() {
            ChangeVerdict::Unchanged
        } else {
            ChangeVerdict::Changed(diff)
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, ChangeVerdict::Changed(_))
    }

    pub fn diff(&self) -> Option<&str> {
        match self {
            ChangeVerdict::Changed(diff) => Some(diff),
            _ => None,
        }
    }
}
