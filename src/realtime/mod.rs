//! Push notifications for the todo collection.
//!
//! A notice says only that something changed; consumers re-fetch the full
//! set instead of applying deltas.

mod client;
pub mod protocol;
mod subscription;

pub use client::RealtimeFeed;
pub use subscription::Subscription;

use async_trait::async_trait;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

use crate::config::Config;

/// Which collection to watch. Every mutation type is delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedTopic {
    pub channel: String,
    pub schema: String,
    pub table: String,
}

impl FeedTopic {
    pub fn new(channel: impl Into<String>, schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            schema: schema.into(),
            table: table.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.realtime.channel.clone(),
            config.table.schema.clone(),
            config.table.name.clone(),
        )
    }

    /// Phoenix topic the channel is joined under.
    pub fn phoenix_topic(&self) -> String {
        format!("realtime:{}", self.channel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
    Unknown,
}

impl ChangeKind {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "INSERT" => ChangeKind::Insert,
            "UPDATE" => ChangeKind::Update,
            "DELETE" => ChangeKind::Delete,
            _ => ChangeKind::Unknown,
        }
    }
}

/// "Something changed in `table`".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotice {
    pub kind: ChangeKind,
    pub table: String,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Failed to connect to change feed: {0}")]
    Connect(#[source] tungstenite::Error),

    #[error("Change feed rejected subscription to '{topic}': {reason}")]
    JoinRejected { topic: String, reason: String },

    #[error("Change feed closed before the subscription was confirmed")]
    Closed,

    #[error("Invalid change feed endpoint: {0}")]
    Endpoint(String),

    #[error("Failed to encode change feed message: {0}")]
    Encode(#[from] serde_json::Error),
}

#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Subscribe to all mutation events of `topic`. Resolves once the service
    /// has confirmed the subscription.
    async fn subscribe(&self, topic: &FeedTopic) -> Result<Subscription, FeedError>;
}
