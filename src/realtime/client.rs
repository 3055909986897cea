use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

use super::protocol::{PhoenixMessage, RefCounter, ReplyStatus, EVENT_SYSTEM};
use super::{ChangeFeed, ChangeNotice, FeedError, FeedTopic, Subscription};
use crate::config::Config;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Sink = SplitSink<Socket, Message>;
type Source = SplitStream<Socket>;

/// [`ChangeFeed`] over the Supabase Realtime websocket.
///
/// Each subscription owns its own connection. There is no reconnection: when
/// the socket goes away the subscription's notice stream ends.
pub struct RealtimeFeed {
    url: Url,
    access_token: String,
    heartbeat: Duration,
}

impl RealtimeFeed {
    pub fn new(config: &Config) -> Result<Self, FeedError> {
        let url = config
            .realtime_url()
            .map_err(|e| FeedError::Endpoint(e.to_string()))?;
        Ok(Self::from_parts(
            url,
            &config.supabase.anon_key,
            Duration::from_secs(config.realtime.heartbeat_seconds),
        ))
    }

    pub fn from_parts(url: Url, access_token: &str, heartbeat: Duration) -> Self {
        Self {
            url,
            access_token: access_token.to_string(),
            heartbeat,
        }
    }
}

#[async_trait]
impl ChangeFeed for RealtimeFeed {
    async fn subscribe(&self, topic: &FeedTopic) -> Result<Subscription, FeedError> {
        tracing::info!(host = ?self.url.host_str(), topic = %topic.phoenix_topic(), "joining change feed");
        let (socket, _) = connect_async(self.url.as_str())
            .await
            .map_err(FeedError::Connect)?;
        let (mut sink, mut source) = socket.split();

        let mut refs = RefCounter::default();
        let join_ref = refs.next_ref();
        send(&mut sink, &PhoenixMessage::join(topic, &self.access_token, &join_ref)).await?;
        await_join(&mut source, topic, &join_ref).await?;
        tracing::info!(topic = %topic.phoenix_topic(), "change feed subscribed");

        let (notices_tx, notices_rx) = mpsc::unbounded_channel();
        let (release_tx, release_rx) = oneshot::channel();
        let channel = Channel {
            sink,
            source,
            topic: topic.clone(),
            join_ref,
            refs,
            heartbeat: self.heartbeat,
        };
        let task = tokio::spawn(channel.run(notices_tx, release_rx));
        Ok(Subscription::new(notices_rx, release_tx, Some(task)))
    }
}

async fn send(sink: &mut Sink, message: &PhoenixMessage) -> Result<(), FeedError> {
    let text = message.encode()?;
    sink.send(Message::text(text)).await.map_err(FeedError::Connect)
}

async fn await_join(source: &mut Source, topic: &FeedTopic, join_ref: &str) -> Result<(), FeedError> {
    while let Some(frame) = source.next().await {
        let text = match frame.map_err(FeedError::Connect)? {
            Message::Text(text) => text,
            Message::Close(_) => return Err(FeedError::Closed),
            _ => continue,
        };
        let Ok(message) = PhoenixMessage::decode(text.as_str()) else {
            tracing::debug!("ignoring undecodable frame while joining");
            continue;
        };
        if message.topic != topic.phoenix_topic() {
            continue;
        }
        match message.reply_to(join_ref) {
            Some(ReplyStatus::Ok) => return Ok(()),
            Some(ReplyStatus::Error(reason)) => {
                return Err(FeedError::JoinRejected {
                    topic: topic.phoenix_topic(),
                    reason,
                })
            }
            None => {}
        }
    }
    Err(FeedError::Closed)
}

/// Joined channel, driven on its own task until released or disconnected.
struct Channel {
    sink: Sink,
    source: Source,
    topic: FeedTopic,
    join_ref: String,
    refs: RefCounter,
    heartbeat: Duration,
}

impl Channel {
    async fn run(mut self, notices: mpsc::UnboundedSender<ChangeNotice>, mut release: oneshot::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.heartbeat);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = &mut release => {
                    self.leave().await;
                    return;
                }
                _ = ticker.tick() => {
                    let heartbeat = PhoenixMessage::heartbeat(&self.refs.next_ref());
                    if let Err(err) = send(&mut self.sink, &heartbeat).await {
                        tracing::warn!(error = %err, "change feed heartbeat failed");
                        return;
                    }
                }
                frame = self.source.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if !self.on_text(text.as_str(), &notices) {
                            return;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(?frame, "change feed closed by server");
                        return;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        tracing::warn!(error = %err, "change feed read error");
                        return;
                    }
                    None => {
                        tracing::warn!("change feed stream ended");
                        return;
                    }
                }
            }
        }
    }

    /// Returns false when the channel is over.
    fn on_text(&self, text: &str, notices: &mpsc::UnboundedSender<ChangeNotice>) -> bool {
        let message = match PhoenixMessage::decode(text) {
            Ok(message) => message,
            Err(err) => {
                tracing::debug!(error = %err, "ignoring undecodable change feed frame");
                return true;
            }
        };

        if let Some(notice) = message.change_notice(&self.topic) {
            tracing::debug!(kind = ?notice.kind, table = %notice.table, "change notice");
            return notices.send(notice).is_ok();
        }
        if message.ends_channel(&self.topic) {
            tracing::warn!(event = %message.event, "change feed channel ended by server");
            return false;
        }
        if message.event == EVENT_SYSTEM
            && message.payload.get("status").and_then(Value::as_str) == Some("error")
        {
            tracing::warn!(payload = %message.payload, "change feed reported a subscription error");
        }
        true
    }

    async fn leave(&mut self) {
        let msg_ref = self.refs.next_ref();
        let leave = PhoenixMessage::leave(&self.topic, &msg_ref, &self.join_ref);
        if let Err(err) = send(&mut self.sink, &leave).await {
            tracing::debug!(error = %err, "change feed leave not delivered");
        }
        let _ = self.sink.close().await;
        tracing::info!(topic = %self.topic.phoenix_topic(), "change feed unsubscribed");
    }
}
