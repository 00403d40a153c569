//! Presentation data derived from the store and UI state.
//!
//! Everything here is a pure function of its inputs and is recomputed on
//! every render. Nothing is cached.

use crate::session::UiState;
use crate::store::TodoStore;
use crate::types::{Filter, Todo};
use std::fmt;
use std::time::Instant;

/// Counts over the whole store, independent of the filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub total: usize,
    pub done: usize,
    pub active: usize,
}

impl Counts {
    /// The count shown on the tab for `filter`.
    pub fn for_filter(&self, filter: Filter) -> usize {
        match filter {
            Filter::All => self.total,
            Filter::Active => self.active,
            Filter::Done => self.done,
        }
    }
}

/// Why the visible list is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The store holds no todos at all.
    NoTasks,
    /// Filter is `done` and nothing is completed.
    NoCompleted,
    /// Filter is `active` and everything is completed.
    NoActive,
}

impl EmptyState {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyState::NoTasks => "No tasks yet!",
            EmptyState::NoCompleted => "No completed tasks.",
            EmptyState::NoActive => "No active tasks. Great job!",
        }
    }
}

impl fmt::Display for EmptyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Todos visible under `filter`, in store order.
pub fn filtered(items: &[Todo], filter: Filter) -> Vec<&Todo> {
    items.iter().filter(|t| filter.matches(t)).collect()
}

pub fn counts(items: &[Todo]) -> Counts {
    let total = items.len();
    let done = items.iter().filter(|t| t.done).count();
    Counts {
        total,
        done,
        active: total - done,
    }
}

/// The empty-state case for a list of `total` todos under `filter`.
///
/// Returns `None` only for a non-empty store under `all`, which can never
/// produce an empty visible list.
pub fn empty_state(total: usize, filter: Filter) -> Option<EmptyState> {
    if total == 0 {
        return Some(EmptyState::NoTasks);
    }
    match filter {
        Filter::All => None,
        Filter::Done => Some(EmptyState::NoCompleted),
        Filter::Active => Some(EmptyState::NoActive),
    }
}

/// Label for a filter tab, e.g. `Active (3)`.
pub fn tab_label(filter: Filter, counts: &Counts) -> String {
    let name = match filter {
        Filter::All => "All",
        Filter::Active => "Active",
        Filter::Done => "Done",
    };
    format!("{} ({})", name, counts.for_filter(filter))
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View<'a> {
    pub filter: Filter,
    pub visible: Vec<&'a Todo>,
    pub counts: Counts,
    /// Set exactly when `visible` is empty.
    pub empty_state: Option<EmptyState>,
    /// Current status text, if one is set and not expired.
    pub status: Option<&'a str>,
    pub input: &'a str,
    /// The add control is enabled.
    pub can_add: bool,
    /// The filter tabs are offered.
    pub show_filters: bool,
    /// The clear-completed control is offered.
    pub can_clear_completed: bool,
    /// The input field should take focus.
    pub focus_input: bool,
}

impl View<'_> {
    /// Tab labels with the selected one marked.
    pub fn tabs(&self) -> Vec<(Filter, String, bool)> {
        Filter::ALL
            .iter()
            .map(|&f| (f, tab_label(f, &self.counts), f == self.filter))
            .collect()
    }
}

/// Project the store and UI state into a `View` at time `now`.
pub fn project<'a>(store: &'a TodoStore, ui: &'a UiState, now: Instant) -> View<'a> {
    let items = store.items();
    let visible = filtered(items, ui.filter);
    let counts = counts(items);
    let empty_state = if visible.is_empty() {
        empty_state(counts.total, ui.filter)
    } else {
        None
    };
    let status = ui
        .status
        .as_ref()
        .filter(|s| s.is_current(now))
        .map(|s| s.text());

    View {
        filter: ui.filter,
        visible,
        counts,
        empty_state,
        status,
        input: &ui.input,
        can_add: !ui.input.trim().is_empty(),
        show_filters: counts.total > 0,
        can_clear_completed: counts.done > 0,
        focus_input: ui.focus_input,
    }
}
