// WebSocket relay: `GET /ws?token=`.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures::StreamExt;
use kings_shared::{RelayClientMsg, RelayServerMsg};
use owo_colors::OwoColorize;
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::server::state::{Grant, RelayState};

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<RelayState>,
    Query(q): Query<WsQuery>,
) -> impl IntoResponse {
    let Some(token) = q.token else {
        return (StatusCode::UNAUTHORIZED, "missing token").into_response();
    };
    match state.redeem(&token).await {
        Some(grant) => ws.on_upgrade(move |socket| handle_socket(socket, state, grant)),
        None => (StatusCode::UNAUTHORIZED, "invalid or expired token").into_response(),
    }
}

async fn handle_socket(mut socket: WebSocket, state: RelayState, grant: Grant) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let peers = match state.join(&grant, tx).await {
        Ok(peers) => peers,
        Err(e) => {
            send_ws(&mut socket, &RelayServerMsg::Error(e.to_string())).await;
            let _ = socket.send(Message::Close(None)).await;
            return;
        }
    };
    let hello = format!("{} {}@{}", "[CONNECT]".bold().green(), grant.name.bold(), grant.room);
    tracing::info!(%hello);

    let welcome = RelayServerMsg::Welcome {
        you: grant.name.clone(),
        room: grant.room.clone(),
        peers,
    };
    if send_ws(&mut socket, &welcome).await {
        loop {
            tokio::select! {
                biased;

                out = rx.recv() => {
                    let Some(msg) = out else { break };
                    if !send_ws(&mut socket, &msg).await {
                        break;
                    }
                }

                incoming = socket.next() => {
                    match incoming {
                        Some(Ok(Message::Text(txt))) => {
                            match serde_json::from_str::<RelayClientMsg>(&txt) {
                                Ok(RelayClientMsg::Publish { payload }) => {
                                    state.forward(&grant.room, &grant.name, payload).await;
                                }
                                Err(e) => {
                                    tracing::warn!(name = %grant.name, error = %e, "failed to parse relay frame");
                                    tracing::debug!(raw_in = %txt);
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                        _ => {}
                    }
                }
            }
        }
    }

    state.leave(&grant.room, &grant.name).await;
    let bye = format!("{} {}@{}", "[DISCONNECT]".bold().yellow(), grant.name, grant.room);
    tracing::info!(%bye);
}

/// Returns false once the socket is gone.
async fn send_ws(socket: &mut WebSocket, msg: &RelayServerMsg) -> bool {
    match serde_json::to_string(msg) {
        Ok(txt) => socket.send(Message::Text(txt)).await.is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize relay frame");
            true
        }
    }
}
