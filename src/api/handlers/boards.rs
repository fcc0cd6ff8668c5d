use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::api::dto::{BoardDetailResponse, CreateBoardRequest, UpdateBoardRequest};
use crate::api::AppState;
use crate::auth::{AuthUser, BoardAccess};
use crate::domain::{Board, SyncError};
use crate::services::{BoardService, ListService};

pub async fn list_boards(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Board>>, SyncError> {
    let boards = BoardService::boards_for_user(&state.db, &user.user_id).await?;
    Ok(Json(boards))
}

pub async fn create_board(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateBoardRequest>,
) -> Result<(StatusCode, Json<Board>), SyncError> {
    let board = BoardService::create_board(&state.db, &user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(board)))
}

pub async fn get_board(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<BoardDetailResponse>, SyncError> {
    BoardAccess::assert_member(&state.db, &user.user_id, &id).await?;

    let board = BoardService::get_board(&state.db, &id).await?;
    let lists = ListService::board_lists(&state.db, &id).await?;

    Ok(Json(BoardDetailResponse { board, lists }))
}

pub async fn update_board(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateBoardRequest>,
) -> Result<Json<Board>, SyncError> {
    BoardAccess::assert_member(&state.db, &user.user_id, &id).await?;

    let board = BoardService::update_board(&state.db, &id, req).await?;
    Ok(Json(board))
}

pub async fn delete_board(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, SyncError> {
    BoardAccess::assert_member(&state.db, &user.user_id, &id).await?;

    let _guard = state.board_locks.acquire(&id).await;
    BoardService::delete_board(&state.db, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}
