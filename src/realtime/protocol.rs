//! Phoenix channel frames (JSON serializer `vsn=1.0.0`) as spoken by Supabase Realtime.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{ChangeKind, ChangeNotice, FeedTopic};

pub const PHOENIX_TOPIC: &str = "phoenix";
pub const EVENT_JOIN: &str = "phx_join";
pub const EVENT_LEAVE: &str = "phx_leave";
pub const EVENT_REPLY: &str = "phx_reply";
pub const EVENT_ERROR: &str = "phx_error";
pub const EVENT_CLOSE: &str = "phx_close";
pub const EVENT_HEARTBEAT: &str = "heartbeat";
pub const EVENT_POSTGRES_CHANGES: &str = "postgres_changes";
pub const EVENT_SYSTEM: &str = "system";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoenixMessage {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default, rename = "ref")]
    pub msg_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_ref: Option<String>,
}

/// Outcome carried by a `phx_reply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyStatus {
    Ok,
    Error(String),
}

impl PhoenixMessage {
    pub fn join(topic: &FeedTopic, access_token: &str, msg_ref: &str) -> Self {
        Self {
            topic: topic.phoenix_topic(),
            event: EVENT_JOIN.to_string(),
            payload: json!({
                "config": {
                    "broadcast": { "ack": false, "self": false },
                    "presence": { "key": "" },
                    "postgres_changes": [
                        { "event": "*", "schema": topic.schema, "table": topic.table }
                    ],
                    "private": false
                },
                "access_token": access_token
            }),
            msg_ref: Some(msg_ref.to_string()),
            join_ref: Some(msg_ref.to_string()),
        }
    }

    pub fn leave(topic: &FeedTopic, msg_ref: &str, join_ref: &str) -> Self {
        Self {
            topic: topic.phoenix_topic(),
            event: EVENT_LEAVE.to_string(),
            payload: json!({}),
            msg_ref: Some(msg_ref.to_string()),
            join_ref: Some(join_ref.to_string()),
        }
    }

    pub fn heartbeat(msg_ref: &str) -> Self {
        Self {
            topic: PHOENIX_TOPIC.to_string(),
            event: EVENT_HEARTBEAT.to_string(),
            payload: json!({}),
            msg_ref: Some(msg_ref.to_string()),
            join_ref: None,
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Reply status when this is a `phx_reply` to `msg_ref`.
    pub fn reply_to(&self, msg_ref: &str) -> Option<ReplyStatus> {
        if self.event != EVENT_REPLY || self.msg_ref.as_deref() != Some(msg_ref) {
            return None;
        }
        match self.payload.get("status").and_then(Value::as_str) {
            Some("ok") => Some(ReplyStatus::Ok),
            other => {
                let reason = self
                    .payload
                    .pointer("/response/reason")
                    .and_then(Value::as_str)
                    .or(other)
                    .unwrap_or("unknown reason");
                Some(ReplyStatus::Error(reason.to_string()))
            }
        }
    }

    /// Data change on this channel, if the frame is one.
    ///
    /// Besides `postgres_changes`, bare `INSERT`/`UPDATE`/`DELETE` events from
    /// older servers are accepted.
    pub fn change_notice(&self, topic: &FeedTopic) -> Option<ChangeNotice> {
        if self.topic != topic.phoenix_topic() {
            return None;
        }
        if self.event == EVENT_POSTGRES_CHANGES {
            let data = self.payload.get("data")?;
            let kind = data
                .get("type")
                .or_else(|| data.get("eventType"))
                .and_then(Value::as_str)
                .map(ChangeKind::parse)
                .unwrap_or(ChangeKind::Unknown);
            let table = data
                .get("table")
                .and_then(Value::as_str)
                .unwrap_or(&topic.table)
                .to_string();
            return Some(ChangeNotice { kind, table });
        }
        match ChangeKind::parse(&self.event) {
            ChangeKind::Unknown => None,
            kind => Some(ChangeNotice {
                kind,
                table: topic.table.clone(),
            }),
        }
    }

    /// True when the server closed or errored this channel.
    pub fn ends_channel(&self, topic: &FeedTopic) -> bool {
        self.topic == topic.phoenix_topic()
            && (self.event == EVENT_CLOSE || self.event == EVENT_ERROR)
    }
}

/// Monotonic message references, as strings.
#[derive(Debug, Default)]
pub struct RefCounter(u64);

impl RefCounter {
    pub fn next_ref(&mut self) -> String {
        self.0 += 1;
        self.0.to_string()
    }
}
