//! Core data types for the todo list.

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single task record. Identity and `created_at` are assigned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Backend-assigned identifier, stable for the item's lifetime
    pub id: i64,

    /// User-supplied text, immutable after creation
    pub text: String,

    /// Completion flag, the only field ever toggled
    pub done: bool,

    /// Opaque display string set once at creation
    pub created_at: String,

    /// Priority requested at creation
    #[serde(default)]
    pub priority: Priority,
}

/// Priority sent with an add request.
///
/// Deserializes leniently: empty, null or unknown values become `Medium`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    /// An empty string falls back to medium.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{}': expected low, medium or high", other)),
        }
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(raw.parse().unwrap_or_else(|e| {
            warn!("{}, using medium", e);
            Priority::Medium
        }))
    }
}

/// View selector. Local UI state only, never sent to the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Active,
    Done,
}

impl Filter {
    /// Every filter, in tab order.
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Active, Filter::Done];

    /// Check whether a todo is visible under this filter.
    pub fn matches(&self, todo: &Todo) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !todo.done,
            Filter::Done => todo.done,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Done => "done",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "done" => Ok(Filter::Done),
            other => Err(format!("unknown filter '{}': expected all, active or done", other)),
        }
    }
}

/// Reasons a command is not issued. No backend call happens when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Input is empty or whitespace only.
    EmptyText,
    /// The id is not in the local list.
    UnknownTodo(i64),
    /// There are no completed todos to clear.
    NothingToClear,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::EmptyText => write!(f, "todo text cannot be empty"),
            Rejection::UnknownTodo(id) => write!(f, "no todo with id {}", id),
            Rejection::NothingToClear => write!(f, "no completed todos to clear"),
        }
    }
}

impl std::error::Error for Rejection {}
