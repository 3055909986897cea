use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEvent};
use futures_util::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::shutdown::ShutdownHandle;
use crate::store::TodoState;

pub enum AppEvent {
    Key(KeyEvent),
    Paste(String),
    Resize(u16, u16),
    Tick,
    /// The store published a new state.
    Store(TodoState),
    /// The change-feed session or an OS signal asked us to stop.
    Shutdown,
}

/// Merges terminal input, ticks, store updates and shutdown into one stream.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    tasks: Vec<JoinHandle<()>>,
}

impl EventHandler {
    pub fn new(
        tick_rate: Duration,
        store: watch::Receiver<TodoState>,
        shutdown: ShutdownHandle,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let tasks = vec![
            tokio::spawn(forward_terminal(tx.clone())),
            tokio::spawn(forward_ticks(tx.clone(), tick_rate)),
            tokio::spawn(forward_store(tx.clone(), store)),
            tokio::spawn(async move {
                shutdown.wait().await;
                let _ = tx.send(AppEvent::Shutdown);
            }),
        ];
        Self { rx, tasks }
    }

    /// `None` once every source is gone.
    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

async fn forward_terminal(tx: mpsc::UnboundedSender<AppEvent>) {
    let mut stream = EventStream::new();
    while let Some(event) = stream.next().await {
        let event = match event {
            Ok(Event::Key(key)) => AppEvent::Key(key),
            Ok(Event::Paste(text)) => AppEvent::Paste(text),
            Ok(Event::Resize(cols, rows)) => AppEvent::Resize(cols, rows),
            Ok(_) => continue,
            Err(err) => {
                tracing::error!(error = %err, "terminal input failed");
                let _ = tx.send(AppEvent::Shutdown);
                return;
            }
        };
        if tx.send(event).is_err() {
            return;
        }
    }
}

async fn forward_ticks(tx: mpsc::UnboundedSender<AppEvent>, tick_rate: Duration) {
    let mut ticker = tokio::time::interval(tick_rate);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        if tx.send(AppEvent::Tick).is_err() {
            return;
        }
    }
}

async fn forward_store(tx: mpsc::UnboundedSender<AppEvent>, mut store: watch::Receiver<TodoState>) {
    while store.changed().await.is_ok() {
        let state = store.borrow_and_update().clone();
        if tx.send(AppEvent::Store(state)).is_err() {
            return;
        }
    }
}
