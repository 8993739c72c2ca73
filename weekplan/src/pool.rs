use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::types::{Todo, TodoId, Week};

/// Unscheduled tasks: ordinary backlog items plus habit templates.
///
/// Storage order is insertion order (newest first for user adds); the views
/// below impose their own ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TodoPool {
    todos: Vec<Todo>,
}

impl TodoPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_todos(todos: Vec<Todo>) -> Self {
        Self { todos }
    }

    /// Parse a stored pool, skipping entries that are not valid tasks.
    pub fn from_stored(raw: serde_json::Value) -> Self {
        let serde_json::Value::Array(items) = raw else {
            tracing::warn!("stored pool is not a list, starting empty");
            return Self::default();
        };
        let todos = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<Todo>(item) {
                Ok(todo) => Some(todo),
                Err(err) => {
                    tracing::warn!(error = %err, "dropping malformed pool entry");
                    None
                }
            })
            .collect();
        Self { todos }
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn into_todos(self) -> Vec<Todo> {
        self.todos
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    pub fn get_mut(&mut self, id: TodoId) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|todo| todo.id == id)
    }

    pub fn todos_mut(&mut self) -> impl Iterator<Item = &mut Todo> {
        self.todos.iter_mut()
    }

    pub fn contains(&self, id: TodoId) -> bool {
        self.get(id).is_some()
    }

    pub fn push_front(&mut self, todo: Todo) {
        self.todos.insert(0, todo);
    }

    pub fn remove(&mut self, id: TodoId) -> Option<Todo> {
        let idx = self.todos.iter().position(|todo| todo.id == id)?;
        Some(self.todos.remove(idx))
    }

    pub fn max_id(&self) -> Option<TodoId> {
        self.todos.iter().map(|todo| todo.id).max()
    }

    /// Non-habit tasks, most recently added (highest id) first.
    pub fn backlog(&self) -> Vec<&Todo> {
        let mut backlog: Vec<&Todo> = self.todos.iter().filter(|todo| !todo.habit).collect();
        backlog.sort_by(|a, b| b.id.cmp(&a.id));
        backlog
    }

    /// Habit templates with no instance scheduled anywhere in `week`.
    pub fn basics_templates(&self, week: &Week) -> Vec<&Todo> {
        let scheduled: HashSet<TodoId> = week
            .todos()
            .filter_map(|(_, _, todo)| todo.source_id)
            .collect();
        self.todos
            .iter()
            .filter(|todo| todo.habit && !scheduled.contains(&todo.id))
            .collect()
    }
}
