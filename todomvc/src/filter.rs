//! Filter views over the todo collection.
//!
//! The navigation state picks one of three read-only projections. None of
//! them own items; they are recomputed from the collection on every read.

use crate::types::TodoItem;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Navigation state selecting which items are listed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// Every item
    #[default]
    All,
    /// Items not yet completed
    Active,
    /// Completed items
    Completed,
}

impl Filter {
    /// Every filter, in navigation order
    pub const ALL: [Self; 3] = [Self::All, Self::Active, Self::Completed];

    /// Returns true if `item` belongs in this view
    #[must_use]
    pub const fn matches(self, item: &TodoItem) -> bool {
        match self {
            Self::All => true,
            Self::Active => !item.is_completed,
            Self::Completed => item.is_completed,
        }
    }

    /// Route name of this filter
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown filter name
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown filter '{0}', expected all, active or completed")]
pub struct ParseFilterError(String);

impl std::str::FromStr for Filter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseFilterError(s.to_string())),
        }
    }
}
