use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use scribepad_core::realtime::ClientMessage;
use scribepad_core::types::DbId;
use scribepad_events::NoteEvent;

use crate::error::AppResult;
use crate::middleware::auth;
use crate::state::AppState;

/// Query parameters for the WebSocket upgrade request.
///
/// Browsers cannot set headers on WebSocket handshakes, so the session token
/// travels as a query parameter.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: String,
}

/// HTTP handler that authenticates and upgrades the connection to WebSocket.
///
/// The token is validated (and the session lease renewed) before the upgrade
/// is accepted; an invalid token is rejected with the usual 401 JSON body.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let auth = auth::authenticate(&state, &query.token).await?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, auth.user_id, auth.username)))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection and announces the new user count.
///   2. Spawns a sender task that forwards messages from the registry channel.
///   3. Processes inbound room join/leave messages on the current task.
///   4. Cleans up and announces the count again on disconnect.
async fn handle_socket(socket: WebSocket, state: AppState, user_id: DbId, username: String) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, user_id, username = %username, "WebSocket connected");

    let mut rx = state.ws_manager.add(conn_id.clone(), user_id).await;
    state
        .event_bus
        .publish(NoteEvent::connections_changed(state.ws_manager.user_count().await));

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward registry channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: process inbound subscription messages.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::NoteJoin { note_id }) => {
                    state.ws_manager.join_room(&conn_id, note_id).await;
                    tracing::debug!(conn_id = %conn_id, note_id, "Joined note room");
                }
                Ok(ClientMessage::NoteLeave { note_id }) => {
                    state.ws_manager.leave_room(&conn_id, note_id).await;
                    tracing::debug!(conn_id = %conn_id, note_id, "Left note room");
                }
                Err(e) => {
                    tracing::debug!(conn_id = %conn_id, error = %e, "Unparseable client message");
                }
            },
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: remove connection, announce the new count, stop the sender.
    state.ws_manager.remove(&conn_id).await;
    state
        .event_bus
        .publish(NoteEvent::connections_changed(state.ws_manager.user_count().await));
    send_task.abort();
    tracing::info!(conn_id = %conn_id, user_id, "WebSocket disconnected");
}
