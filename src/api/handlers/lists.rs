use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::api::dto::{CreateListRequest, ReorderListRequest, UpdateListRequest};
use crate::api::handlers::publish_event;
use crate::api::AppState;
use crate::auth::{AuthUser, BoardAccess};
use crate::domain::{BoardEvent, List, SyncError};
use crate::services::ListService;

pub async fn create_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(board_id): Path<String>,
    Json(req): Json<CreateListRequest>,
) -> Result<(StatusCode, Json<List>), SyncError> {
    BoardAccess::assert_member(&state.db, &user.user_id, &board_id).await?;

    let _guard = state.board_locks.acquire(&board_id).await;
    let list = ListService::create_list(&state.db, &board_id, req).await?;
    publish_event(&state, BoardEvent::ListAdded { list: list.clone() });

    Ok((StatusCode::CREATED, Json(list)))
}

pub async fn update_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateListRequest>,
) -> Result<Json<List>, SyncError> {
    let existing = ListService::get_list(&state.db, &id).await?;
    BoardAccess::assert_member(&state.db, &user.user_id, &existing.board_id).await?;

    let _guard = state.board_locks.acquire(&existing.board_id).await;
    let list = ListService::update_list(&state.db, &id, req).await?;
    publish_event(&state, BoardEvent::ListModified { list: list.clone() });

    Ok(Json(list))
}

pub async fn reorder_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<ReorderListRequest>,
) -> Result<Json<List>, SyncError> {
    let existing = ListService::get_list(&state.db, &id).await?;
    BoardAccess::assert_member(&state.db, &user.user_id, &existing.board_id).await?;

    let _guard = state.board_locks.acquire(&existing.board_id).await;
    let list = ListService::reorder_list(&state.db, &id, req).await?;
    publish_event(&state, BoardEvent::ListModified { list: list.clone() });

    Ok(Json(list))
}

pub async fn delete_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, SyncError> {
    let existing = ListService::get_list(&state.db, &id).await?;
    BoardAccess::assert_member(&state.db, &user.user_id, &existing.board_id).await?;

    let _guard = state.board_locks.acquire(&existing.board_id).await;
    let list = ListService::delete_list(&state.db, &id).await?;
    publish_event(&state, BoardEvent::ListRemoved { list });

    Ok(StatusCode::NO_CONTENT)
}
