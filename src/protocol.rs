//! IPC protocol types for the backend daemon.
//!
//! One JSON object per line in each direction.

use crate::types::{Priority, Todo};
use serde::{Deserialize, Serialize};

/// Request sent from client to daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Fetch the full list.
    GetTodos,

    /// Create a todo.
    AddTodo {
        text: String,
        #[serde(default)]
        priority: Priority,
    },

    /// Flip one todo's done flag.
    ToggleTodo { id: i64 },

    /// Remove one todo.
    DeleteTodo { id: i64 },

    /// Remove every completed todo.
    ClearCompleted,

    /// Export the list.
    ExportTodos,

    /// Ping to check if daemon is alive.
    Ping,

    /// Shutdown the daemon.
    Shutdown,
}

/// Response sent from daemon to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    /// Full list, or null.
    Todos { todos: Option<Vec<Todo>> },

    /// A newly created todo.
    Todo { todo: Todo },

    /// Export finished. Empty path means cancelled.
    Exported { path: String },

    /// Operation succeeded.
    Ok,

    /// Pong response to ping.
    Pong,

    /// Error response.
    Error { message: String },
}

impl Response {
    /// Create an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
