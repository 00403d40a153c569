//! One UI session: the todo store plus local UI state.
//!
//! Command constructors check preconditions and return the `Command` to
//! issue; they never touch the store. The store changes only in `apply`,
//! from a backend answer.

use crate::command::{Command, Completion, ExportOutcome, ListOutcome};
use crate::status::{self, TransientStatus};
use crate::store::TodoStore;
use crate::types::{Filter, Priority, Rejection};
use crate::view::{self, View};
use log::{debug, info};
use std::time::{Duration, Instant};

/// Local UI state. Not persisted, not sent to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub filter: Filter,
    pub input: String,
    pub status: Option<TransientStatus>,
    /// Set after a successful add so the renderer refocuses the input.
    pub focus_input: bool,
}

/// Tunables for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Priority sent with every add
    pub default_priority: Priority,

    /// How long "Saved as ..." stays up
    pub export_saved_ttl: Duration,

    /// How long "Export failed!" stays up
    pub export_failed_ttl: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_priority: Priority::Medium,
            export_saved_ttl: Duration::from_secs(4),
            export_failed_ttl: Duration::from_secs(3),
        }
    }
}

/// Store, UI state and settings for one session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    store: TodoStore,
    ui: UiState,
    settings: Settings,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            store: TodoStore::new(),
            ui: UiState::default(),
            settings,
        }
    }

    pub fn store(&self) -> &TodoStore {
        &self.store
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.ui.input = input.into();
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.ui.filter = filter;
    }

    /// Clear the refocus request once the renderer has honored it.
    pub fn acknowledge_focus(&mut self) {
        self.ui.focus_input = false;
    }

    /// Drop the status if it has expired.
    pub fn clear_expired_status(&mut self, now: Instant) {
        if self.ui.status.as_ref().is_some_and(|s| !s.is_current(now)) {
            self.ui.status = None;
        }
    }

    /// The initial full-list fetch.
    pub fn load(&self) -> Command {
        Command::Load
    }

    /// Add the current input. Enter and the add control both land here.
    ///
    /// The text is sent as typed; only the emptiness check trims it.
    pub fn submit(&self) -> Result<Command, Rejection> {
        if self.ui.input.trim().is_empty() {
            return Err(Rejection::EmptyText);
        }
        Ok(Command::Add {
            text: self.ui.input.clone(),
            priority: self.settings.default_priority,
        })
    }

    pub fn toggle(&self, id: i64) -> Result<Command, Rejection> {
        if !self.store.contains(id) {
            return Err(Rejection::UnknownTodo(id));
        }
        Ok(Command::Toggle { id })
    }

    pub fn delete(&self, id: i64) -> Result<Command, Rejection> {
        if !self.store.contains(id) {
            return Err(Rejection::UnknownTodo(id));
        }
        Ok(Command::Delete { id })
    }

    /// Only offered while something is completed.
    pub fn clear_completed(&self) -> Result<Command, Rejection> {
        if self.store.done_count() == 0 {
            return Err(Rejection::NothingToClear);
        }
        Ok(Command::ClearCompleted)
    }

    /// Start an export. Shows the pending status until the answer arrives.
    pub fn export(&mut self) -> Command {
        self.ui.status = Some(TransientStatus::sticky(status::EXPORT_PENDING));
        Command::Export
    }

    /// Apply a finished round trip.
    pub fn apply(&mut self, completion: Completion, now: Instant) {
        match completion {
            Completion::Loaded(outcome) | Completion::Cleared(outcome) => self.apply_list(outcome),

            Completion::Toggled { id, outcome } | Completion::Deleted { id, outcome } => {
                debug!("Applying list answer for todo {}", id);
                self.apply_list(outcome);
            }

            Completion::Added(Some(todo)) => {
                info!("Added todo {}", todo.id);
                self.store.append(todo);
                self.ui.input.clear();
                self.ui.focus_input = true;
            }

            // Input is kept so the user can retry
            Completion::Added(None) => {}

            Completion::Exported(ExportOutcome::Saved(path)) => {
                self.ui.status = Some(TransientStatus::expiring(
                    status::saved_message(&path),
                    now,
                    self.settings.export_saved_ttl,
                ));
            }

            Completion::Exported(ExportOutcome::Cancelled) => {
                self.ui.status = None;
            }

            Completion::Exported(ExportOutcome::Failed(_)) => {
                self.ui.status = Some(TransientStatus::expiring(
                    status::EXPORT_FAILED,
                    now,
                    self.settings.export_failed_ttl,
                ));
            }
        }
    }

    fn apply_list(&mut self, outcome: ListOutcome) {
        if let ListOutcome::Replace(todos) = outcome {
            self.store.replace_all(todos);
        }
    }

    /// Project the session for rendering at `now`.
    pub fn view(&self, now: Instant) -> View<'_> {
        view::project(&self.store, &self.ui, now)
    }
}
