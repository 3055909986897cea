//! In-memory service and change feed for store tests.
//!
//! Every successful write on [`MemoryGateway`] is announced on its change
//! feed, the way the hosted service does for all clients.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use supatodo::gateway::{ServiceError, TodoGateway};
use supatodo::model::{NewTodo, Todo, TodoUpdate};
use supatodo::realtime::{ChangeFeed, ChangeKind, ChangeNotice, FeedError, FeedTopic, Subscription};
use tokio::sync::{broadcast, mpsc, oneshot, watch};

#[derive(Default)]
struct Rows {
    todos: Vec<Todo>,
    next_id: u64,
    clock: i64,
}

#[derive(Default)]
struct Faults {
    list: bool,
    create: bool,
    update: bool,
    deletes: HashSet<String>,
}

pub struct MemoryGateway {
    rows: Mutex<Rows>,
    faults: Mutex<Faults>,
    changes: broadcast::Sender<ChangeNotice>,
    list_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl MemoryGateway {
    pub fn new() -> Arc<Self> {
        let (changes, _) = broadcast::channel(64);
        Arc::new(Self {
            rows: Mutex::new(Rows::default()),
            faults: Mutex::new(Faults::default()),
            changes,
            list_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        })
    }

    /// Seed rows directly, without change notices.
    pub fn seed(&self, todos: Vec<Todo>) {
        let mut rows = self.rows.lock();
        rows.clock = rows.clock.max(todos.len() as i64);
        rows.todos.extend(todos);
    }

    pub fn rows(&self) -> Vec<Todo> {
        self.rows.lock().todos.clone()
    }

    pub fn fail_list(&self, fail: bool) {
        self.faults.lock().list = fail;
    }

    pub fn fail_create(&self, fail: bool) {
        self.faults.lock().create = fail;
    }

    pub fn fail_update(&self, fail: bool) {
        self.faults.lock().update = fail;
    }

    pub fn fail_delete_of(&self, id: &str) {
        self.faults.lock().deletes.insert(id.to_string());
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// Change feed fed by this gateway's writes.
    pub fn feed(self: &Arc<Self>) -> Arc<LocalFeed> {
        let (kill, _) = watch::channel(false);
        Arc::new(LocalFeed {
            changes: self.changes.clone(),
            reject: false,
            kill,
        })
    }

    /// Announce a change made by some other client.
    pub fn announce(&self, kind: ChangeKind) {
        let _ = self.changes.send(ChangeNotice {
            kind,
            table: "todos".to_string(),
        });
    }

    fn rejected(message: &str) -> ServiceError {
        ServiceError::Api {
            status: 500,
            code: None,
            message: message.to_string(),
        }
    }

    fn tick(rows: &mut Rows) -> DateTime<Utc> {
        rows.clock += 1;
        Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap() + Duration::seconds(rows.clock)
    }
}

#[async_trait]
impl TodoGateway for MemoryGateway {
    async fn list(&self) -> Result<Vec<Todo>, ServiceError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.faults.lock().list {
            return Err(Self::rejected("list unavailable"));
        }
        let mut todos = self.rows.lock().todos.clone();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(todos)
    }

    async fn create(&self, draft: &NewTodo) -> Result<Todo, ServiceError> {
        if self.faults.lock().create {
            return Err(Self::rejected("insert rejected"));
        }
        let todo = {
            let mut rows = self.rows.lock();
            rows.next_id += 1;
            let now = Self::tick(&mut rows);
            let todo = Todo {
                id: format!("mem-{}", rows.next_id),
                title: draft.title.clone(),
                completed: draft.completed,
                created_at: now,
                updated_at: now,
            };
            rows.todos.push(todo.clone());
            todo
        };
        self.announce(ChangeKind::Insert);
        Ok(todo)
    }

    async fn update(&self, id: &str, update: &TodoUpdate) -> Result<Todo, ServiceError> {
        if self.faults.lock().update {
            return Err(Self::rejected("update rejected"));
        }
        let todo = {
            let mut rows = self.rows.lock();
            let now = Self::tick(&mut rows);
            let todo = rows
                .todos
                .iter_mut()
                .find(|todo| todo.id == id)
                .ok_or_else(|| ServiceError::NotFound { id: id.to_string() })?;
            update.apply_to(todo);
            todo.updated_at = now;
            todo.clone()
        };
        self.announce(ChangeKind::Update);
        Ok(todo)
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        // Let the other deletes of a batch start before this one settles.
        tokio::task::yield_now().await;
        if self.faults.lock().deletes.contains(id) {
            return Err(Self::rejected(&format!("delete of {id} rejected")));
        }
        let removed = {
            let mut rows = self.rows.lock();
            let before = rows.todos.len();
            rows.todos.retain(|todo| todo.id != id);
            rows.todos.len() != before
        };
        if removed {
            self.announce(ChangeKind::Delete);
        }
        Ok(())
    }
}

/// [`ChangeFeed`] over a [`MemoryGateway`]'s announcements.
pub struct LocalFeed {
    changes: broadcast::Sender<ChangeNotice>,
    reject: bool,
    kill: watch::Sender<bool>,
}

impl LocalFeed {
    /// A feed whose subscriptions are always refused.
    pub fn rejecting() -> Arc<Self> {
        let (changes, _) = broadcast::channel(1);
        let (kill, _) = watch::channel(false);
        Arc::new(Self {
            changes,
            reject: true,
            kill,
        })
    }

    /// End every open subscription as if the connection dropped.
    pub fn drop_connections(&self) {
        let _ = self.kill.send(true);
    }

    pub fn subscriber_count(&self) -> usize {
        self.changes.receiver_count()
    }
}

#[async_trait]
impl ChangeFeed for LocalFeed {
    async fn subscribe(&self, topic: &FeedTopic) -> Result<Subscription, FeedError> {
        if self.reject {
            return Err(FeedError::JoinRejected {
                topic: topic.phoenix_topic(),
                reason: "not allowed".to_string(),
            });
        }
        let mut changes = self.changes.subscribe();
        let mut kill = self.kill.subscribe();
        let (notices_tx, notices_rx) = mpsc::unbounded_channel();
        let (release_tx, mut release_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut release_rx => return,
                    _ = kill.changed() => return,
                    change = changes.recv() => match change {
                        Ok(notice) => {
                            if notices_tx.send(notice).is_err() {
                                return;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => return,
                    }
                }
            }
        });
        Ok(Subscription::new(notices_rx, release_tx, Some(task)))
    }
}
