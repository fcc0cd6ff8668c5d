use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::api::AppState;
use crate::auth::{jwt, BoardAccess};
use crate::domain::SyncError;
use crate::sync::ConnectionId;

/// Channel protocol, client to server. Board membership is never inferred:
/// a connection observes exactly the boards it has joined.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    JoinBoard { board_id: String },
    LeaveBoard { board_id: String },
}

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: String,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<WsQuery>,
) -> Result<impl IntoResponse, SyncError> {
    let claims = jwt::verify_token(&state.config.jwt_secret, &params.token)
        .map_err(|e| SyncError::Unauthorized(format!("Invalid token: {e}")))?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, claims.sub)))
}

async fn handle_socket(mut socket: WebSocket, state: AppState, user_id: String) {
    let connection_id: ConnectionId = Uuid::new_v4();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    state.registry.register(connection_id, tx);

    tracing::debug!(%connection_id, user_id = user_id.as_str(), "websocket connected");

    let _ = socket
        .send(Message::Text(r#"{"type":"connected"}"#.into()))
        .await;

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(err) =
                            handle_client_message(&state, connection_id, &user_id, text.as_str())
                                .await
                        {
                            let frame =
                                json!({ "type": "error", "message": err.to_string() }).to_string();
                            if socket.send(Message::Text(frame.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
            outbound = rx.recv() => {
                match outbound {
                    Some(payload) => {
                        if socket.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    // Every exit path lands here, including half-open sockets and timeouts:
    // the connection leaves every board it observed.
    state.registry.disconnect(connection_id);
    tracing::debug!(%connection_id, "websocket disconnected");
}

async fn handle_client_message(
    state: &AppState,
    connection_id: ConnectionId,
    user_id: &str,
    text: &str,
) -> Result<(), SyncError> {
    let message: ClientMessage = serde_json::from_str(text)
        .map_err(|_| SyncError::Validation("Unrecognized channel message".into()))?;

    match message {
        ClientMessage::JoinBoard { board_id } => {
            BoardAccess::assert_member(&state.db, user_id, &board_id).await?;
            state.registry.join(connection_id, &board_id);
            tracing::debug!(%connection_id, board_id = board_id.as_str(), "joined board channel");
        }
        ClientMessage::LeaveBoard { board_id } => {
            state.registry.leave(connection_id, &board_id);
            tracing::debug!(%connection_id, board_id = board_id.as_str(), "left board channel");
        }
    }

    Ok(())
}
