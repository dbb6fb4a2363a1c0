use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::realtime::dispatcher::VoteUpdate;
use crate::realtime::registry::ConnectionId;
use crate::services::aggregation;
use crate::state::AppState;

/// Pending result snapshots buffered per connection. Small on purpose: a
/// reader this far behind only needs the latest state, and every update
/// carries it in full.
const SINK_CAPACITY: usize = 16;

/// Bound on a single outbound frame so an unresponsive peer cannot wedge
/// its own drain loop indefinitely.
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
enum ClientMessage {
    JoinPoll { poll_id: String },
    LeavePoll { poll_id: Option<String> },
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id = Uuid::new_v4();
    let (updates_tx, mut updates_rx) = mpsc::channel::<VoteUpdate>(SINK_CAPACITY);
    state.registry.connect(connection_id, updates_tx);
    debug!(%connection_id, "websocket connected");

    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            inbound = ws_rx.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        if handle_client_message(&text, connection_id, &state, &mut ws_tx)
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        debug!(%connection_id, "websocket read error: {}", err);
                        break;
                    }
                }
            }
            update = updates_rx.recv() => {
                let Some(update) = update else { break };
                if send_update(&mut ws_tx, &update).await.is_err() {
                    break;
                }
            }
        }
    }

    state.registry.on_disconnect(connection_id);
    debug!(%connection_id, "websocket disconnected");
}

async fn handle_client_message(
    text: &str,
    connection_id: ConnectionId,
    state: &AppState,
    ws_tx: &mut SplitSink<WebSocket, Message>,
) -> Result<(), axum::Error> {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(err) => {
            debug!(%connection_id, "ignoring unrecognized message: {}", err);
            return Ok(());
        }
    };

    match message {
        ClientMessage::JoinPoll { poll_id } => {
            state.registry.join(connection_id, &poll_id);
            debug!(%connection_id, %poll_id, "joined poll");

            // Catch-up read: the observer gets the current aggregate right
            // away instead of waiting for the next commit to push one.
            match aggregation::compute(&state.db, &poll_id).await {
                Ok(aggregate) => send_update(ws_tx, &VoteUpdate::from(aggregate)).await?,
                Err(err) => {
                    debug!(%connection_id, %poll_id, "no catch-up aggregate: {}", err);
                }
            }
        }
        ClientMessage::LeavePoll { poll_id } => {
            state.registry.leave(connection_id);
            debug!(%connection_id, ?poll_id, "left poll");
        }
    }

    Ok(())
}

async fn send_update(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    update: &VoteUpdate,
) -> Result<(), axum::Error> {
    let payload = json!({
        "type": "vote-update",
        "pollId": update.poll_id,
        "results": update.results,
    });

    match timeout(SEND_TIMEOUT, ws_tx.send(Message::Text(payload.to_string()))).await {
        Ok(result) => result,
        Err(_) => {
            warn!("vote update send timed out");
            Err(axum::Error::new("vote update send timed out"))
        }
    }
}
