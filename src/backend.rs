//! The backend collaborator contract.
//!
//! The backend owns all durable state and assigns ids. Every call is
//! asynchronous and may fail. Full-list calls may also answer `None`, which
//! the command layer treats as "no change".

use crate::types::{Priority, Todo};
use eyre::Result;
use std::future::Future;

/// The six calls the todo core makes against its backend.
pub trait Backend {
    /// Fetch the full list.
    fn get_todos(&self) -> impl Future<Output = Result<Option<Vec<Todo>>>>;

    /// Create a todo. Answers with the new item only.
    fn add_todo(&self, text: &str, priority: Priority) -> impl Future<Output = Result<Todo>>;

    /// Flip `done` on one todo and answer with the full list.
    fn toggle_todo(&self, id: i64) -> impl Future<Output = Result<Option<Vec<Todo>>>>;

    /// Remove one todo and answer with the full list.
    fn delete_todo(&self, id: i64) -> impl Future<Output = Result<Option<Vec<Todo>>>>;

    /// Remove every completed todo and answer with the full list.
    fn clear_completed(&self) -> impl Future<Output = Result<Option<Vec<Todo>>>>;

    /// Export the list. Answers with the saved path, or an empty string if
    /// the user cancelled.
    fn export_todos(&self) -> impl Future<Output = Result<String>>;
}
