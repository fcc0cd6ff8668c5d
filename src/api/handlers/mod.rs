pub mod boards;
pub mod cards;
pub mod lists;
pub mod ws;

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::api::state::AppState;
use crate::domain::BoardEvent;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Fire-and-forget publish. Delivery problems are logged, never returned to
/// the initiating client.
pub(crate) fn publish_event(state: &AppState, event: BoardEvent) {
    if let Err(err) = state.broadcaster.publish(&event) {
        tracing::warn!(error = %err, "failed to publish board event");
    }
}
