use crate::task::Task;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Completion-based listing filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFilter {
    /// Every task in store order.
    #[default]
    All,
    /// Tasks that are not yet complete.
    Active,
    /// Tasks that are complete.
    Completed,
}

impl TaskFilter {
    /// String representation used on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// Whether `task` belongs in this listing.
    #[must_use]
    pub const fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

/// Error returned when a filter token is not recognized.
#[derive(Debug, Error)]
#[error("invalid filter: {token}")]
pub struct ParseFilterError {
    /// The rejected input.
    pub token: String,
}

impl FromStr for TaskFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" | "open" => Ok(Self::Active),
            "completed" | "done" => Ok(Self::Completed),
            _ => Err(ParseFilterError { token: s.to_owned() }),
        }
    }
}
