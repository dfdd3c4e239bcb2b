use std::{collections::BTreeMap, sync::{Arc, Mutex}};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::lock;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields to change on an existing todo; `None` leaves the field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl TodoChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none()
    }
}

pub trait TodoStore: Send + Sync {
    /// All todos, newest (highest id) first.
    fn all(&self) -> Result<Vec<Todo>>;

    fn find(&self, id: u64) -> Result<Option<Todo>>;

    fn create(&self, title: String) -> Result<Todo>;

    /// Applies `changes` and returns the stored todo, or `None` when it does not exist.
    fn update(&self, id: u64, changes: TodoChanges) -> Result<Option<Todo>>;

    /// Returns whether a todo was removed.
    fn delete(&self, id: u64) -> Result<bool>;
}

pub type TodoStoreService = Arc<dyn TodoStore>;

#[derive(Debug, Default)]
struct State {
    last_id: u64,
    todos: BTreeMap<u64, Todo>,
}

#[derive(Debug, Default)]
pub struct InMemoryTodoStore {
    state: Mutex<State>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TodoStore for InMemoryTodoStore {
    fn all(&self) -> Result<Vec<Todo>> {
        let state = lock(&self.state, "todo")?;
        Ok(state.todos.values().rev().cloned().collect())
    }

    fn find(&self, id: u64) -> Result<Option<Todo>> {
        Ok(lock(&self.state, "todo")?.todos.get(&id).cloned())
    }

    fn create(&self, title: String) -> Result<Todo> {
        let mut state = lock(&self.state, "todo")?;
        state.last_id += 1;
        let now = Utc::now();
        let todo = Todo {
            id: state.last_id,
            title,
            completed: false,
            created_at: now,
            updated_at: now,
        };
        state.todos.insert(todo.id, todo.clone());
        Ok(todo)
    }

    fn update(&self, id: u64, changes: TodoChanges) -> Result<Option<Todo>> {
        let mut state = lock(&self.state, "todo")?;
        let Some(todo) = state.todos.get_mut(&id) else {
            return Ok(None);
        };
        if !changes.is_empty() {
            if let Some(title) = changes.title {
                todo.title = title;
            }
            if let Some(completed) = changes.completed {
                todo.completed = completed;
            }
            todo.updated_at = Utc::now();
        }
        Ok(Some(todo.clone()))
    }

    fn delete(&self, id: u64) -> Result<bool> {
        Ok(lock(&self.state, "todo")?.todos.remove(&id).is_some())
    }
}
