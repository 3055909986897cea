use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::ChangeNotice;

/// Live subscription to a change feed.
///
/// Released either explicitly with [`Subscription::unsubscribe`], which waits
/// for the channel to be left, or by dropping it, which only signals the release.
pub struct Subscription {
    notices: mpsc::UnboundedReceiver<ChangeNotice>,
    release: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// `release` is fired exactly once when the subscriber goes away; `task`
    /// is the driver that owns the underlying connection, if any.
    pub fn new(
        notices: mpsc::UnboundedReceiver<ChangeNotice>,
        release: oneshot::Sender<()>,
        task: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            notices,
            release: Some(release),
            task,
        }
    }

    /// Next notice, or `None` once the feed has ended.
    pub async fn next(&mut self) -> Option<ChangeNotice> {
        self.notices.recv().await
    }

    pub async fn unsubscribe(mut self) {
        if let Some(release) = self.release.take() {
            let _ = release.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::warn!(error = %err, "change feed driver ended abnormally");
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            let _ = release.send(());
        }
    }
}
