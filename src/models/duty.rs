//! Duty kinds.
//!
//! A closed set of known chores plus a free-text fallback for households
//! that track more than garbage/kitchen and bathroom duty.
//!
//! # Exclusivity
//! Exclusive duties are held by at most one room per week. Custom duties
//! and `Free` may be shared by any number of rooms.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A chore assigned to a room for one week.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DutyKind {
    /// No chore this week.
    Free,
    /// Taking out the garbage and cleaning the kitchen (weekly).
    GarbageKitchen,
    /// Cleaning the bathroom (biweekly in the rotating plan).
    Bathroom,
    /// Household-specific chore.
    Custom(String),
}

impl DutyKind {
    /// Whether at most one room may hold this duty in a given week.
    pub fn is_exclusive(&self) -> bool {
        matches!(self, Self::GarbageKitchen | Self::Bathroom)
    }

    /// Stable textual key, used in config files.
    pub fn key(&self) -> &str {
        match self {
            Self::Free => "free",
            Self::GarbageKitchen => "garbage_kitchen",
            Self::Bathroom => "bathroom",
            Self::Custom(label) => label,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        match self {
            Self::Free => "Free",
            Self::GarbageKitchen => "Garbage & Kitchen Cleaning",
            Self::Bathroom => "Bathroom Cleaning",
            Self::Custom(label) => label,
        }
    }

    /// Decorative prefix shown before the label.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Free => "🌴",
            Self::GarbageKitchen => "🗑️",
            Self::Bathroom => "🛁",
            Self::Custom(_) => "🧹",
        }
    }
}

impl fmt::Display for DutyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DutyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("duty label must not be empty".to_string());
        }
        let kind = match trimmed.to_ascii_lowercase().as_str() {
            "free" => Self::Free,
            "garbage_kitchen" | "garbage & kitchen" | "garbage & kitchen cleaning" => {
                Self::GarbageKitchen
            }
            "bathroom" | "bathroom cleaning" => Self::Bathroom,
            _ => Self::Custom(trimmed.to_string()),
        };
        Ok(kind)
    }
}

impl TryFrom<String> for DutyKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DutyKind> for String {
    fn from(kind: DutyKind) -> Self {
        kind.key().to_string()
    }
}
