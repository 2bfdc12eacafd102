use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};

use stage_core::types::DbId;

use crate::error::AppResult;
use crate::state::AppState;

/// Interval between keep-alive pings on a subscription connection.
const PING_INTERVAL_SECS: u64 = 30;

/// GET /api/v1/stage/{session_id}/ws
///
/// Upgrades to WebSocket and streams the session's updates. Unknown
/// sessions are rejected before the upgrade.
pub async fn stage_ws_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<DbId>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    // Resolve the initial frames first so a bad session id fails as a
    // regular 404 instead of after the upgrade.
    let initial = state.engine.initial_updates(session_id).await?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, session_id, state, initial)))
}

/// Manage a single subscription connection after upgrade.
///
/// 1. Registers with the `SyncHub` and replays the full current state.
/// 2. Spawns a sender task forwarding hub updates (with periodic pings).
/// 3. Drains inbound messages on the current task (only Close matters).
/// 4. Unsubscribes on disconnect; unsubscription is idempotent, so a
///    racing hub shutdown is harmless.
async fn handle_socket(
    socket: WebSocket,
    session_id: DbId,
    state: AppState,
    initial: Vec<stage_events::StageUpdate>,
) {
    let (token, mut rx) = state.hub.subscribe(session_id).await;
    tracing::info!(session_id, "Stage subscriber connected");

    let (mut sink, mut stream) = socket.split();

    // Sender task: initial snapshot replay, then hub updates + pings.
    let send_task = tokio::spawn(async move {
        for update in initial {
            if send_update(&mut sink, &update).await.is_err() {
                return;
            }
        }

        let mut ping = tokio::time::interval(Duration::from_secs(PING_INTERVAL_SECS));
        ping.tick().await; // the first tick fires immediately
        loop {
            tokio::select! {
                update = rx.recv() => {
                    match update {
                        Some(update) => {
                            if send_update(&mut sink, &update).await.is_err() {
                                break;
                            }
                        }
                        // Hub shut down: tell the client we are done.
                        None => {
                            let _ = sink.send(Message::Close(None)).await;
                            break;
                        }
                    }
                }
                _ = ping.tick() => {
                    if sink.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Receiver loop: subscriptions are one-way; inbound frames are only
    // connection management.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(session_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(session_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    state.hub.unsubscribe(&token).await;
    send_task.abort();
    tracing::info!(session_id, "Stage subscriber disconnected");
}

/// Serialize one update as a text frame and push it to the sink.
async fn send_update(
    sink: &mut SplitSink<WebSocket, Message>,
    update: &stage_events::StageUpdate,
) -> Result<(), ()> {
    let json = serde_json::to_string(update).map_err(|e| {
        tracing::error!(error = %e, "Failed to serialize stage update");
    })?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
