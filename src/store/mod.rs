//! Synchronization store: the process-wide todo state as an explicit,
//! cloneable context object.
//!
//! The store never patches its record set from a mutation result. Every
//! mutation goes to the gateway; the set is only replaced by [`TodoStore::refresh`],
//! which the mounted change feed calls on every notice, including notices caused
//! by this client's own writes.

mod intent;
mod reducer;
mod session;
mod state;

pub use intent::StoreIntent;
pub use reducer::TodoReducer;
pub use session::StoreSession;
pub use state::{FeedStatus, SyncPhase, TodoState};

use std::sync::Arc;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::sync::watch;

use crate::error::{SyncError, SyncFailure};
use crate::gateway::TodoGateway;
use crate::model::{NewTodo, TodoFilter, TodoUpdate};
use crate::mvi::Reducer;
use crate::realtime::{ChangeFeed, FeedTopic};

#[derive(Clone)]
pub struct TodoStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    gateway: Arc<dyn TodoGateway>,
    state: watch::Sender<TodoState>,
}

impl TodoStore {
    pub fn new(gateway: Arc<dyn TodoGateway>) -> Self {
        let (state, _) = watch::channel(TodoState::default());
        Self {
            inner: Arc::new(StoreInner { gateway, state }),
        }
    }

    /// Current state, cloned.
    pub fn snapshot(&self) -> TodoState {
        self.inner.state.borrow().clone()
    }

    /// Receiver that is notified whenever the state actually changes.
    pub fn subscribe(&self) -> watch::Receiver<TodoState> {
        self.inner.state.subscribe()
    }

    /// Wait until `predicate` holds and return that state.
    pub async fn wait_until<F>(&self, predicate: F) -> TodoState
    where
        F: FnMut(&TodoState) -> bool,
    {
        let mut rx = self.subscribe();
        // The sender lives as long as `self`, so the channel cannot close here.
        let result = rx.wait_for(predicate).await.map(|state| state.clone());
        result.unwrap_or_else(|_| self.snapshot())
    }

    /// Start the change-feed session: subscribe, load, then refresh on every notice.
    pub fn mount(&self, feed: Arc<dyn ChangeFeed>, topic: FeedTopic) -> StoreSession {
        StoreSession::spawn(self.clone(), feed, topic)
    }

    /// Replace the record set with the service's current contents.
    pub async fn refresh(&self) {
        match self.inner.gateway.list().await {
            Ok(todos) => {
                tracing::debug!(count = todos.len(), "todos refreshed");
                self.dispatch(StoreIntent::Loaded { todos });
            }
            Err(source) => {
                let err = SyncError::Fetch(source);
                tracing::warn!(op = %err.op(), error = %err, "store operation failed");
                self.dispatch(StoreIntent::LoadFailed {
                    failure: SyncFailure::from(&err),
                });
            }
        }
    }

    /// Create an active todo. It shows up with the next refresh.
    pub async fn add(&self, title: &str) {
        match self.inner.gateway.create(&NewTodo::new(title)).await {
            Ok(todo) => tracing::debug!(id = %todo.id, "todo created"),
            Err(source) => self.fail(SyncError::Add(source)),
        }
    }

    pub async fn set(&self, id: &str, update: TodoUpdate) {
        if let Err(source) = self.inner.gateway.update(id, &update).await {
            self.fail(SyncError::Update {
                id: id.to_string(),
                source,
            });
        }
    }

    /// Flip `completed` of a loaded todo. Unknown ids are ignored.
    pub async fn toggle(&self, id: &str) {
        let completed = self.inner.state.borrow().find(id).map(|todo| todo.completed);
        match completed {
            Some(completed) => self.set(id, TodoUpdate::completed(!completed)).await,
            None => tracing::debug!(id, "toggle target not loaded; ignoring"),
        }
    }

    pub async fn remove(&self, id: &str) {
        if let Err(source) = self.inner.gateway.delete(id).await {
            self.fail(SyncError::Delete {
                id: id.to_string(),
                source,
            });
        }
    }

    /// Delete every currently completed todo, all requests in flight at once.
    ///
    /// Every delete runs to completion. If any fails, one aggregated error
    /// naming the earliest failure is recorded; successful deletes stand.
    pub async fn clear_completed(&self) {
        let ids: Vec<String> = self
            .inner
            .state
            .borrow()
            .todos
            .iter()
            .filter(|todo| todo.completed)
            .map(|todo| todo.id.clone())
            .collect();
        if ids.is_empty() {
            return;
        }

        let attempted = ids.len();
        let mut pending: FuturesUnordered<_> = ids
            .iter()
            .map(|id| self.inner.gateway.delete(id))
            .collect();

        let mut failed = 0;
        let mut first = None;
        while let Some(result) = pending.next().await {
            if let Err(err) = result {
                failed += 1;
                if first.is_none() {
                    first = Some(err);
                } else {
                    tracing::debug!(error = %err, "additional clear-completed failure");
                }
            }
        }

        match first {
            Some(first) => self.fail(SyncError::ClearCompleted {
                attempted,
                failed,
                first,
            }),
            None => tracing::info!(deleted = attempted, "cleared completed todos"),
        }
    }

    pub fn set_filter(&self, filter: TodoFilter) {
        self.dispatch(StoreIntent::SetFilter { filter });
    }

    pub fn clear_error(&self) {
        self.dispatch(StoreIntent::ClearError);
    }

    pub(crate) fn set_feed_status(&self, status: FeedStatus) {
        self.dispatch(StoreIntent::Feed { status });
    }

    pub(crate) fn fail(&self, err: SyncError) {
        tracing::warn!(op = %err.op(), error = %err, "store operation failed");
        self.dispatch(StoreIntent::Failed {
            failure: SyncFailure::from(&err),
        });
    }

    fn dispatch(&self, intent: StoreIntent) {
        self.inner.state.send_if_modified(|state| {
            let next = TodoReducer::reduce(state.clone(), intent);
            if next == *state {
                return false;
            }
            *state = next;
            true
        });
    }
}
