use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{broadcast, mpsc};

use crate::{
    realtime::{Realtime, RealtimeEvent},
    state::AppState,
};

/// A client announces the channels it wants by sending `{"join": "<identity>"}`
/// frames; identities are user ids or emails and are normalized to lowercase.
/// Joins are client-asserted and not verified against a credential.
#[derive(Debug, Deserialize)]
struct JoinRequest {
    join: String,
}

pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.realtime))
}

async fn handle_socket(socket: WebSocket, realtime: Realtime) {
    let (mut sink, mut stream) = socket.split();

    // All joined channels funnel into one queue so a single writer owns the sink.
    let (tx, mut rx) = mpsc::unbounded_channel::<RealtimeEvent>();

    // Every connection hears site-wide broadcasts, joined or not.
    tokio::spawn(forward(realtime.subscribe_everyone(), tx.clone()));

    loop {
        tokio::select! {
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(request) = serde_json::from_str::<JoinRequest>(&text) {
                            let channel = realtime.join(&request.join).await;
                            tokio::spawn(forward(channel, tx.clone()));
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
            outgoing = rx.recv() => {
                let Some(event) = outgoing else { break };
                let Ok(text) = serde_json::to_string(&event) else { continue };
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    }
}

/// Drain a channel subscription into the connection's queue until either side
/// goes away. A lagging client loses the skipped events, not the connection.
async fn forward(
    mut channel: broadcast::Receiver<RealtimeEvent>,
    tx: mpsc::UnboundedSender<RealtimeEvent>,
) {
    loop {
        match channel.recv().await {
            Ok(event) => {
                if tx.send(event).is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "slow websocket client skipped events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
