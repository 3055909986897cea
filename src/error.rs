//! Store-level failures.
//!
//! Gateway and feed errors never reach the view as `Err`: the store logs the
//! full [`SyncError`] and keeps a [`SyncFailure`] summary in its error slot.

use std::fmt;

use thiserror::Error;

use crate::gateway::ServiceError;
use crate::realtime::FeedError;

/// Which store operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncOp {
    Refresh,
    Add,
    Update,
    Delete,
    ClearCompleted,
    Feed,
}

impl SyncOp {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncOp::Refresh => "refresh",
            SyncOp::Add => "add",
            SyncOp::Update => "update",
            SyncOp::Delete => "delete",
            SyncOp::ClearCompleted => "clear_completed",
            SyncOp::Feed => "feed",
        }
    }
}

impl fmt::Display for SyncOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Failed to fetch todos: {0}")]
    Fetch(#[source] ServiceError),

    #[error("Failed to add todo: {0}")]
    Add(#[source] ServiceError),

    #[error("Failed to update todo: {source}")]
    Update {
        id: String,
        #[source]
        source: ServiceError,
    },

    #[error("Failed to delete todo: {source}")]
    Delete {
        id: String,
        #[source]
        source: ServiceError,
    },

    /// Some deletes of a clear-completed batch were rejected. Others may have
    /// gone through; nothing is rolled back.
    #[error("Failed to clear completed todos ({failed} of {attempted} deletes failed): {first}")]
    ClearCompleted {
        attempted: usize,
        failed: usize,
        #[source]
        first: ServiceError,
    },

    #[error("Change feed unavailable: {0}")]
    Feed(#[source] FeedError),

    #[error("Change feed closed; changes made elsewhere will not appear until refreshed")]
    FeedClosed,
}

impl SyncError {
    pub fn op(&self) -> SyncOp {
        match self {
            SyncError::Fetch(_) => SyncOp::Refresh,
            SyncError::Add(_) => SyncOp::Add,
            SyncError::Update { .. } => SyncOp::Update,
            SyncError::Delete { .. } => SyncOp::Delete,
            SyncError::ClearCompleted { .. } => SyncOp::ClearCompleted,
            SyncError::Feed(_) | SyncError::FeedClosed => SyncOp::Feed,
        }
    }
}

/// Latest error as held in store state: comparable and cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub op: SyncOp,
    pub message: String,
}

impl SyncFailure {
    pub fn new(op: SyncOp, message: impl Into<String>) -> Self {
        Self {
            op,
            message: message.into(),
        }
    }
}

impl From<&SyncError> for SyncFailure {
    fn from(err: &SyncError) -> Self {
        SyncFailure::new(err.op(), err.to_string())
    }
}

impl fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_completed_reports_first_failure() {
        let err = SyncError::ClearCompleted {
            attempted: 3,
            failed: 2,
            first: ServiceError::Api {
                status: 403,
                code: Some("42501".to_string()),
                message: "permission denied".to_string(),
            },
        };
        let failure = SyncFailure::from(&err);
        assert_eq!(failure.op, SyncOp::ClearCompleted);
        assert_eq!(
            failure.to_string(),
            "Failed to clear completed todos (2 of 3 deletes failed): Service error: 403 - permission denied"
        );
    }

    #[test]
    fn ops_map_to_variants() {
        let not_found = || ServiceError::NotFound { id: "x".to_string() };
        assert_eq!(SyncError::Fetch(not_found()).op(), SyncOp::Refresh);
        assert_eq!(SyncError::Add(not_found()).op(), SyncOp::Add);
        assert_eq!(
            SyncError::Update { id: "x".to_string(), source: not_found() }.op(),
            SyncOp::Update
        );
        assert_eq!(SyncError::FeedClosed.op(), SyncOp::Feed);
    }
}
