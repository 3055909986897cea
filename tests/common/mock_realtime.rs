//! Mock Realtime websocket server speaking the Phoenix channel protocol.

#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message;

/// How the server answers `phx_join`.
#[derive(Debug, Clone)]
pub enum JoinReply {
    Ok,
    Reject(String),
    /// Never answer.
    Silent,
}

enum Outbound {
    Text(String),
    Close,
}

pub struct MockRealtime {
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<Value>>>,
    outbound: mpsc::UnboundedSender<Outbound>,
}

impl MockRealtime {
    pub async fn start(join: JoinReply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock realtime server");
        let addr = listener.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let outbound_rx = Arc::new(Mutex::new(outbound_rx));

        let log = Arc::clone(&received);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let Ok(socket) = tokio_tungstenite::accept_async(stream).await else {
                    continue;
                };
                serve(socket, join.clone(), Arc::clone(&log), Arc::clone(&outbound_rx)).await;
            }
        });

        Self {
            addr,
            received,
            outbound: outbound_tx,
        }
    }

    /// Service base URL; the feed derives `ws://.../realtime/v1/websocket` from it.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> url::Url {
        url::Url::parse(&format!(
            "ws://{}/realtime/v1/websocket?apikey=anon&vsn=1.0.0",
            self.addr
        ))
        .unwrap()
    }

    pub async fn received(&self) -> Vec<Value> {
        self.received.lock().await.clone()
    }

    /// Wait until a client frame with `event` arrives.
    pub async fn wait_for_event(&self, event: &str) -> Value {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(frame) = self
                .received
                .lock()
                .await
                .iter()
                .find(|frame| frame["event"] == event)
                .cloned()
            {
                return frame;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "no '{event}' frame received"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Push a `postgres_changes` frame for `topic`.
    pub fn push_change(&self, topic: &str, kind: &str) {
        let frame = json!({
            "topic": topic,
            "event": "postgres_changes",
            "payload": {
                "ids": [1],
                "data": {
                    "type": kind,
                    "schema": "public",
                    "table": "todos",
                    "commit_timestamp": "2024-03-01T09:00:00Z",
                    "record": {},
                    "old_record": {}
                }
            },
            "ref": null
        });
        let _ = self.outbound.send(Outbound::Text(frame.to_string()));
    }

    pub fn push_raw(&self, frame: Value) {
        let _ = self.outbound.send(Outbound::Text(frame.to_string()));
    }

    /// Close the current connection from the server side.
    pub fn close(&self) {
        let _ = self.outbound.send(Outbound::Close);
    }
}

async fn serve(
    socket: tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>,
    join: JoinReply,
    log: Arc<Mutex<Vec<Value>>>,
    outbound: Arc<Mutex<mpsc::UnboundedReceiver<Outbound>>>,
) {
    let (mut sink, mut source) = socket.split();
    let mut outbound = outbound.lock().await;
    loop {
        tokio::select! {
            frame = source.next() => {
                let text = match frame {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return,
                    Some(Ok(_)) => continue,
                };
                let Ok(frame) = serde_json::from_str::<Value>(text.as_str()) else {
                    continue;
                };
                log.lock().await.push(frame.clone());
                let reply = match frame["event"].as_str() {
                    Some("phx_join") => match &join {
                        JoinReply::Ok => Some(json!({ "status": "ok", "response": { "postgres_changes": [{ "id": 1 }] } })),
                        JoinReply::Reject(reason) => Some(json!({ "status": "error", "response": { "reason": reason } })),
                        JoinReply::Silent => None,
                    },
                    Some("phx_leave") | Some("heartbeat") => Some(json!({ "status": "ok", "response": {} })),
                    _ => None,
                };
                if let Some(payload) = reply {
                    let message = json!({
                        "topic": frame["topic"],
                        "event": "phx_reply",
                        "payload": payload,
                        "ref": frame["ref"],
                        "join_ref": frame["join_ref"],
                    });
                    if sink.send(Message::text(message.to_string())).await.is_err() {
                        return;
                    }
                }
            }
            outgoing = outbound.recv() => match outgoing {
                Some(Outbound::Text(text)) => {
                    if sink.send(Message::text(text)).await.is_err() {
                        return;
                    }
                }
                Some(Outbound::Close) | None => {
                    let _ = sink.close().await;
                    return;
                }
            }
        }
    }
}
