//! Session-scoped cache of backend-confirmed todos.
//!
//! The list is only ever set from data the backend returned. There is no
//! in-place mutation: toggles, deletes and clears all arrive as a full list
//! and replace the sequence wholesale. Adds are the one exception, because
//! the backend answers an add with the new item only.

use crate::types::Todo;
use log::warn;
use std::collections::HashSet;

/// Ordered list of todos, at most one per id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoStore {
    items: Vec<Todo>,
}

impl TodoStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entire sequence with a backend response.
    ///
    /// Duplicate ids keep their first occurrence.
    pub fn replace_all(&mut self, items: Vec<Todo>) {
        let mut seen = HashSet::with_capacity(items.len());
        let mut deduped = Vec::with_capacity(items.len());
        for item in items {
            if seen.insert(item.id) {
                deduped.push(item);
            } else {
                warn!("Dropping duplicate todo id {} from backend list", item.id);
            }
        }
        self.items = deduped;
    }

    /// Append an item returned by an add.
    ///
    /// If the id is already present the existing entry is replaced in place.
    pub fn append(&mut self, item: Todo) {
        match self.items.iter_mut().find(|t| t.id == item.id) {
            Some(existing) => {
                warn!("Backend returned existing id {} for an add, replacing", item.id);
                *existing = item;
            }
            None => self.items.push(item),
        }
    }

    pub fn items(&self) -> &[Todo] {
        &self.items
    }

    pub fn get(&self, id: i64) -> Option<&Todo> {
        self.items.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn done_count(&self) -> usize {
        self.items.iter().filter(|t| t.done).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Priority;

    fn todo(id: i64, done: bool) -> Todo {
        Todo {
            id,
            text: format!("task {}", id),
            done,
            created_at: "12:00".to_string(),
            priority: Priority::Medium,
        }
    }

    #[test]
    fn test_replace_all_overwrites_previous_items() {
        let mut store = TodoStore::new();
        store.replace_all(vec![todo(1, false), todo(2, false)]);
        store.replace_all(vec![todo(3, true)]);

        assert_eq!(store.len(), 1);
        assert_eq!(store.items()[0].id, 3);
        assert!(!store.contains(1));
    }

    #[test]
    fn test_replace_all_drops_duplicate_ids() {
        let mut store = TodoStore::new();
        let mut dup = todo(1, true);
        dup.text = "second copy".to_string();
        store.replace_all(vec![todo(1, false), todo(2, false), dup]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).unwrap().text, "task 1");
        assert!(!store.get(1).unwrap().done);
    }

    #[test]
    fn test_append_adds_to_end() {
        let mut store = TodoStore::new();
        store.replace_all(vec![todo(2, false), todo(1, false)]);
        store.append(todo(3, false));

        let ids: Vec<i64> = store.items().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_append_existing_id_replaces_in_place() {
        let mut store = TodoStore::new();
        store.replace_all(vec![todo(1, false), todo(2, false)]);
        let mut updated = todo(1, false);
        updated.text = "renamed".to_string();
        store.append(updated);

        assert_eq!(store.len(), 2);
        assert_eq!(store.items()[0].text, "renamed");
    }

    #[test]
    fn test_done_count() {
        let mut store = TodoStore::new();
        assert_eq!(store.done_count(), 0);
        store.replace_all(vec![todo(1, true), todo(2, false), todo(3, true)]);
        assert_eq!(store.done_count(), 2);
    }
}
