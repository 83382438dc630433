//! WebSocket session against the room relay.
//!
//! `connect` opens the socket, waits for the relay's welcome and then splits
//! the connection into a [`WsTransport`] for publishing and a channel of
//! [`TransportEvent`]s for everything the relay reports.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures_util::{SinkExt, StreamExt};
use kad_kings::{Credential, Transport, TransportError, TransportEvent};
use kings_shared::{Identity, RelayClientMsg, RelayServerMsg};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

const WELCOME_TIMEOUT: Duration = Duration::from_secs(5);

/// Publishes through the relay connection's writer task.
#[derive(Clone)]
pub struct WsTransport {
    tx: mpsc::UnboundedSender<Message>,
}

impl Transport for WsTransport {
    fn publish(&mut self, payload: Vec<u8>) -> Result<(), TransportError> {
        let frame = RelayClientMsg::Publish {
            payload: hex::encode(payload),
        };
        let txt = serde_json::to_string(&frame).map_err(|e| TransportError::Send(e.to_string()))?;
        self.tx
            .send(Message::Text(txt))
            .map_err(|_| TransportError::Closed)
    }
}

/// An established relay session.
pub struct Connection {
    pub transport: WsTransport,
    pub events: mpsc::UnboundedReceiver<TransportEvent>,
    pub you: Identity,
    pub room: String,
    /// Members present before we arrived.
    pub peers: Vec<Identity>,
}

pub async fn connect(credential: &Credential) -> Result<Connection> {
    let url = Url::parse(&credential.session_url())
        .with_context(|| format!("parsing session url '{}'", credential.url))?;
    if !matches!(url.scheme(), "ws" | "wss") {
        bail!("session url must be ws:// or wss://, got '{}'", url.scheme());
    }

    let (stream, _) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .with_context(|| format!("connecting to {}", credential.url))?;
    let (mut write, mut read) = stream.split();

    let (you, room, peers) = tokio::time::timeout(WELCOME_TIMEOUT, async {
        while let Some(msg) = read.next().await {
            match msg.context("reading from relay")? {
                Message::Text(txt) => match serde_json::from_str::<RelayServerMsg>(&txt) {
                    Ok(RelayServerMsg::Welcome { you, room, peers }) => {
                        return Ok((you, room, peers))
                    }
                    Ok(RelayServerMsg::Error(e)) => bail!("relay refused the session: {e}"),
                    Ok(other) => tracing::debug!(?other, "frame before welcome"),
                    Err(e) => tracing::debug!(error = %e, "unparseable frame before welcome"),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
        bail!("relay closed the connection before welcoming us")
    })
    .await
    .context("waiting for the relay's welcome")??;
    tracing::info!(you = %you, room = %room, peers = peers.len(), "connected to relay");

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();
    tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            if write.send(msg).await.is_err() {
                break;
            }
        }
        let _ = write.close().await;
    });

    let (ev_tx, ev_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(msg) = read.next().await {
            let txt = match msg {
                Ok(Message::Text(txt)) => txt,
                Ok(Message::Close(_)) | Err(_) => break,
                Ok(_) => continue,
            };
            let Some(event) = to_event(&txt) else {
                continue;
            };
            if ev_tx.send(event).is_err() {
                return;
            }
        }
        let _ = ev_tx.send(TransportEvent::Disconnected);
    });

    Ok(Connection {
        transport: WsTransport { tx: out_tx },
        events: ev_rx,
        you,
        room,
        peers,
    })
}

fn to_event(txt: &str) -> Option<TransportEvent> {
    let msg = match serde_json::from_str::<RelayServerMsg>(txt) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::debug!(error = %e, "dropping unparseable relay frame");
            return None;
        }
    };
    match msg {
        RelayServerMsg::Data { from, payload } => match hex::decode(&payload) {
            Ok(payload) => Some(TransportEvent::Message {
                from: Some(from),
                payload,
            }),
            Err(e) => {
                tracing::debug!(from = %from, error = %e, "dropping payload with bad hex");
                None
            }
        },
        RelayServerMsg::PeerJoined(who) => Some(TransportEvent::PeerJoined(who)),
        RelayServerMsg::PeerLeft(who) => Some(TransportEvent::PeerLeft(who)),
        RelayServerMsg::Error(e) => {
            tracing::warn!(error = %e, "relay error");
            None
        }
        RelayServerMsg::Welcome { .. } => None,
    }
}
