//! User commands and their backend round trips.
//!
//! `execute` performs exactly one backend call per command and folds the
//! answer into a `Completion`. Every failure is absorbed here: a completion
//! never carries an error, only what the session should apply.

use crate::backend::Backend;
use crate::types::{Priority, Todo};
use log::{debug, warn};

/// One user intent, mapped to exactly one backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load,
    Add { text: String, priority: Priority },
    Toggle { id: i64 },
    Delete { id: i64 },
    ClearCompleted,
    Export,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Load => "load",
            Command::Add { .. } => "add",
            Command::Toggle { .. } => "toggle",
            Command::Delete { .. } => "delete",
            Command::ClearCompleted => "clear-completed",
            Command::Export => "export",
        }
    }
}

/// What a full-list call means for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOutcome {
    /// Replace the store with this list.
    Replace(Vec<Todo>),
    /// Leave the store as it is.
    Unchanged,
}

/// Result of an export call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Saved to this path.
    Saved(String),
    /// The user dismissed the save dialog.
    Cancelled,
    /// The call failed.
    Failed(String),
}

/// A finished round trip, ready to be applied to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Loaded(ListOutcome),
    /// `None` when the add failed; nothing is appended.
    Added(Option<Todo>),
    Toggled { id: i64, outcome: ListOutcome },
    Deleted { id: i64, outcome: ListOutcome },
    Cleared(ListOutcome),
    Exported(ExportOutcome),
}

/// Issue the backend call for `command` and fold its answer.
pub async fn execute<B: Backend>(backend: &B, command: Command) -> Completion {
    debug!("Executing {} command", command.name());
    match command {
        Command::Load => Completion::Loaded(load_outcome(backend.get_todos().await)),

        Command::Add { text, priority } => match backend.add_todo(&text, priority).await {
            Ok(todo) => Completion::Added(Some(todo)),
            Err(e) => {
                warn!("Add failed, nothing appended: {:#}", e);
                Completion::Added(None)
            }
        },

        Command::Toggle { id } => Completion::Toggled {
            id,
            outcome: list_outcome("toggle", backend.toggle_todo(id).await),
        },

        Command::Delete { id } => Completion::Deleted {
            id,
            outcome: list_outcome("delete", backend.delete_todo(id).await),
        },

        Command::ClearCompleted => Completion::Cleared(list_outcome("clear-completed", backend.clear_completed().await)),

        Command::Export => {
            let outcome = match backend.export_todos().await {
                Ok(path) if path.is_empty() => ExportOutcome::Cancelled,
                Ok(path) => ExportOutcome::Saved(path),
                Err(e) => {
                    warn!("Export failed: {:#}", e);
                    ExportOutcome::Failed(format!("{:#}", e))
                }
            };
            Completion::Exported(outcome)
        }
    }
}

/// A null initial list loads as empty. A failed load keeps the store as is.
fn load_outcome(result: eyre::Result<Option<Vec<Todo>>>) -> ListOutcome {
    match result {
        Ok(Some(todos)) => ListOutcome::Replace(todos),
        Ok(None) => {
            warn!("Backend returned no list on load, starting empty");
            ListOutcome::Replace(Vec::new())
        }
        Err(e) => {
            warn!("Load failed, keeping current list: {:#}", e);
            ListOutcome::Unchanged
        }
    }
}

/// Null and failed full-list answers both leave the store untouched.
fn list_outcome(name: &str, result: eyre::Result<Option<Vec<Todo>>>) -> ListOutcome {
    match result {
        Ok(Some(todos)) => ListOutcome::Replace(todos),
        Ok(None) => {
            warn!("Backend returned no list for {}, keeping current list", name);
            ListOutcome::Unchanged
        }
        Err(e) => {
            warn!("{} failed, keeping current list: {:#}", name, e);
            ListOutcome::Unchanged
        }
    }
}
