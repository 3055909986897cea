use crate::error::SyncFailure;
use crate::model::{Todo, TodoFilter};
use crate::mvi::Intent;
use crate::store::state::FeedStatus;

#[derive(Debug, Clone)]
pub enum StoreIntent {
    /// A list call succeeded with the authoritative set.
    Loaded { todos: Vec<Todo> },
    /// A list call failed.
    LoadFailed { failure: SyncFailure },
    /// Any other operation failed.
    Failed { failure: SyncFailure },
    SetFilter { filter: TodoFilter },
    ClearError,
    Feed { status: FeedStatus },
}

impl Intent for StoreIntent {}
