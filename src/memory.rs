//! In-process reference backend.
//!
//! Holds todos in memory behind a mutex and answers every call the way the
//! contract describes. Used by the daemon and by tests; it persists nothing.

use crate::backend::Backend;
use crate::types::{Priority, Todo};
use chrono::Local;
use eyre::{Context, Result, eyre};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    todos: Vec<Todo>,
}

impl Inner {
    /// All todos, newest first.
    fn snapshot(&self) -> Vec<Todo> {
        let mut todos = self.todos.clone();
        todos.sort_by(|a, b| b.id.cmp(&a.id));
        todos
    }
}

/// Reference backend keeping todos in memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
    export_dir: Option<PathBuf>,
}

impl MemoryBackend {
    /// Create an empty backend. Exports are treated as cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty backend that writes exports into `dir`.
    pub fn with_export_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            inner: Mutex::default(),
            export_dir: Some(dir.into()),
        }
    }

    pub fn export_dir(&self) -> Option<&Path> {
        self.export_dir.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| eyre!("backend state lock poisoned"))
    }

    fn write_export(&self, dir: &Path, todos: &[Todo]) -> Result<String> {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create export directory {}", dir.display()))?;

        let json = serde_json::to_string_pretty(todos).context("Failed to serialize todos")?;
        let filename = format!("todos-{}.json", Local::now().format("%Y-%m-%d_%H-%M-%S"));
        let path = dir.join(filename);
        fs::write(&path, json).with_context(|| format!("Failed to write export file {}", path.display()))?;

        info!("Exported {} todos to {}", todos.len(), path.display());
        Ok(path.to_string_lossy().into_owned())
    }
}

impl Backend for MemoryBackend {
    async fn get_todos(&self) -> Result<Option<Vec<Todo>>> {
        Ok(Some(self.lock()?.snapshot()))
    }

    async fn add_todo(&self, text: &str, priority: Priority) -> Result<Todo> {
        let mut inner = self.lock()?;
        inner.next_id += 1;
        let todo = Todo {
            id: inner.next_id,
            text: text.to_string(),
            done: false,
            created_at: Local::now().format("%H:%M").to_string(),
            priority,
        };
        inner.todos.push(todo.clone());
        debug!("Added todo {}", todo.id);
        Ok(todo)
    }

    async fn toggle_todo(&self, id: i64) -> Result<Option<Vec<Todo>>> {
        let mut inner = self.lock()?;
        let Some(todo) = inner.todos.iter_mut().find(|t| t.id == id) else {
            debug!("Toggle of unknown todo {}", id);
            return Ok(None);
        };
        todo.done = !todo.done;
        Ok(Some(inner.snapshot()))
    }

    async fn delete_todo(&self, id: i64) -> Result<Option<Vec<Todo>>> {
        let mut inner = self.lock()?;
        inner.todos.retain(|t| t.id != id);
        Ok(Some(inner.snapshot()))
    }

    async fn clear_completed(&self) -> Result<Option<Vec<Todo>>> {
        let mut inner = self.lock()?;
        inner.todos.retain(|t| !t.done);
        Ok(Some(inner.snapshot()))
    }

    async fn export_todos(&self) -> Result<String> {
        let todos = self.lock()?.snapshot();
        match &self.export_dir {
            Some(dir) if !todos.is_empty() => self.write_export(dir, &todos),
            _ => Ok(String::new()),
        }
    }
}
