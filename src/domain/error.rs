use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("access denied: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid move: {0}")]
    InvalidMove(String),

    #[error("concurrent modification: {0}")]
    ConcurrentModification(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for SyncError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            SyncError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            SyncError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            SyncError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            SyncError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            SyncError::InvalidMove(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            SyncError::ConcurrentModification(msg) => (StatusCode::CONFLICT, msg.clone()),
            SyncError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            SyncError::Database(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
            SyncError::Serialization(err) => {
                tracing::error!("Serialization error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };

        let body = json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
