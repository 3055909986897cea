use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::SyncError;
use crate::realtime::{ChangeFeed, FeedTopic};
use crate::store::state::FeedStatus;
use crate::store::TodoStore;

/// A mounted store: owns the feed subscription and the listener that turns
/// every notice into a refresh.
///
/// [`StoreSession::close`] unsubscribes and waits for it; dropping the
/// session requests the same teardown without waiting.
pub struct StoreSession {
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl StoreSession {
    pub(crate) fn spawn(store: TodoStore, feed: Arc<dyn ChangeFeed>, topic: FeedTopic) -> Self {
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(listen(store, feed, topic, stop_rx));
        Self {
            stop: Some(stop_tx),
            task: Some(task),
        }
    }

    pub async fn close(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::warn!(error = %err, "store session ended abnormally");
            }
        }
    }
}

impl Drop for StoreSession {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

async fn listen(
    store: TodoStore,
    feed: Arc<dyn ChangeFeed>,
    topic: FeedTopic,
    mut stop: oneshot::Receiver<()>,
) {
    store.set_feed_status(FeedStatus::Connecting);

    // Subscribe and load concurrently; notices arriving in between are queued.
    let connect = async {
        let (subscription, ()) = tokio::join!(feed.subscribe(&topic), store.refresh());
        subscription
    };
    let subscription = tokio::select! {
        _ = &mut stop => {
            store.set_feed_status(FeedStatus::Closed);
            return;
        }
        subscription = connect => subscription,
    };

    let mut subscription = match subscription {
        Ok(subscription) => subscription,
        Err(err) => {
            store.fail(SyncError::Feed(err));
            store.set_feed_status(FeedStatus::Closed);
            return;
        }
    };
    store.set_feed_status(FeedStatus::Live);
    tracing::info!(topic = %topic.phoenix_topic(), "store mounted");

    loop {
        tokio::select! {
            _ = &mut stop => break,
            notice = subscription.next() => match notice {
                Some(notice) => {
                    tracing::debug!(kind = ?notice.kind, "refreshing after change notice");
                    store.refresh().await;
                }
                None => {
                    store.fail(SyncError::FeedClosed);
                    store.set_feed_status(FeedStatus::Closed);
                    return;
                }
            }
        }
    }

    subscription.unsubscribe().await;
    store.set_feed_status(FeedStatus::Closed);
    tracing::info!(topic = %topic.phoenix_topic(), "store unmounted");
}
