use crate::error::SyncFailure;
use crate::filter::{project, FilterCounts};
use crate::model::{Todo, TodoFilter};
use crate::mvi::State;

/// Connection state of the change feed behind the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedStatus {
    /// No feed attached; the set only changes on explicit refresh.
    #[default]
    Detached,
    Connecting,
    Live,
    Closed,
}

/// Coarse store phase, derived from `loading` and `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Loading,
    Ready,
    ReadyWithError,
}

/// Everything a view needs to render the todo list.
///
/// `todos` is a non-authoritative copy of the remote collection, replaced
/// wholesale on each successful refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct TodoState {
    pub todos: Vec<Todo>,
    pub filter: TodoFilter,
    pub loading: bool,
    pub error: Option<SyncFailure>,
    pub feed: FeedStatus,
}

impl Default for TodoState {
    fn default() -> Self {
        Self {
            todos: Vec::new(),
            filter: TodoFilter::All,
            loading: true,
            error: None,
            feed: FeedStatus::Detached,
        }
    }
}

impl State for TodoState {}

impl TodoState {
    /// Records matching the current filter, newest first.
    pub fn visible(&self) -> Vec<&Todo> {
        project(&self.todos, self.filter)
    }

    pub fn counts(&self) -> FilterCounts {
        FilterCounts::of(&self.todos)
    }

    pub fn find(&self, id: &str) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    pub fn phase(&self) -> SyncPhase {
        if self.loading {
            SyncPhase::Loading
        } else if self.error.is_some() {
            SyncPhase::ReadyWithError
        } else {
            SyncPhase::Ready
        }
    }
}
