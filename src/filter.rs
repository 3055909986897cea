//! Pure projection of the full record set onto a filter mode.

use crate::model::{Todo, TodoFilter};

/// Records visible under `filter`, in the order of `todos`.
pub fn project(todos: &[Todo], filter: TodoFilter) -> Vec<&Todo> {
    todos.iter().filter(|todo| filter.matches(todo)).collect()
}

/// Per-mode tallies, shown next to the filter tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCounts {
    pub all: usize,
    pub active: usize,
    pub completed: usize,
}

impl FilterCounts {
    pub fn of(todos: &[Todo]) -> Self {
        let completed = todos.iter().filter(|todo| todo.completed).count();
        Self {
            all: todos.len(),
            active: todos.len() - completed,
            completed,
        }
    }

    pub fn get(&self, filter: TodoFilter) -> usize {
        match filter {
            TodoFilter::All => self.all,
            TodoFilter::Active => self.active,
            TodoFilter::Completed => self.completed,
        }
    }
}
