use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use crate::api::dto::{
    BoardCardsQuery, CardEnvelope, CreateCardRequest, MoveCardRequest, UpdateCardRequest,
};
use crate::api::handlers::publish_event;
use crate::api::AppState;
use crate::auth::{AuthUser, BoardAccess};
use crate::domain::{BoardEvent, Card, SyncError};
use crate::services::{CardService, MoveEngine};

pub async fn board_cards(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<BoardCardsQuery>,
) -> Result<Json<Vec<Card>>, SyncError> {
    BoardAccess::assert_member(&state.db, &user.user_id, &query.board_id).await?;

    let cards = CardService::board_cards(&state.db, &query.board_id).await?;
    Ok(Json(cards))
}

pub async fn create_card(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<CardEnvelope>), SyncError> {
    BoardAccess::assert_member(&state.db, &user.user_id, &req.board_id).await?;

    let _guard = state.board_locks.acquire(&req.board_id).await;
    let card = CardService::create_card(&state.db, req).await?;
    publish_event(&state, BoardEvent::CardAdded { card: card.clone() });

    Ok((StatusCode::CREATED, Json(CardEnvelope { card })))
}

pub async fn get_card(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<CardEnvelope>, SyncError> {
    let card = CardService::get_card(&state.db, &id).await?;
    BoardAccess::assert_member(&state.db, &user.user_id, &card.board_id).await?;

    Ok(Json(CardEnvelope { card }))
}

pub async fn update_card(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCardRequest>,
) -> Result<Json<CardEnvelope>, SyncError> {
    let existing = CardService::get_card(&state.db, &id).await?;
    BoardAccess::assert_member(&state.db, &user.user_id, &existing.board_id).await?;

    let _guard = state.board_locks.acquire(&existing.board_id).await;
    let card = CardService::update_card(&state.db, &id, req).await?;
    publish_event(&state, BoardEvent::CardModified { card: card.clone() });

    Ok(Json(CardEnvelope { card }))
}

pub async fn move_card(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<MoveCardRequest>,
) -> Result<Json<CardEnvelope>, SyncError> {
    let existing = CardService::get_card(&state.db, &id).await?;
    BoardAccess::assert_member(&state.db, &user.user_id, &existing.board_id).await?;

    // Read-compute-write of the position index plus the publish run under
    // the board's exclusion scope; observers see events in commit order.
    let _guard = state.board_locks.acquire(&existing.board_id).await;
    let card = MoveEngine::execute(
        &state.db,
        &id,
        &req.destination_list_id,
        req.destination_index,
    )
    .await?;
    publish_event(&state, BoardEvent::CardModified { card: card.clone() });

    Ok(Json(CardEnvelope { card }))
}

pub async fn toggle_complete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<CardEnvelope>, SyncError> {
    let existing = CardService::get_card(&state.db, &id).await?;
    BoardAccess::assert_member(&state.db, &user.user_id, &existing.board_id).await?;

    let _guard = state.board_locks.acquire(&existing.board_id).await;
    let card = CardService::toggle_complete(&state.db, &id).await?;
    publish_event(&state, BoardEvent::CardModified { card: card.clone() });

    Ok(Json(CardEnvelope { card }))
}

pub async fn delete_card(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, SyncError> {
    let existing = CardService::get_card(&state.db, &id).await?;
    BoardAccess::assert_member(&state.db, &user.user_id, &existing.board_id).await?;

    let _guard = state.board_locks.acquire(&existing.board_id).await;
    let card = CardService::delete_card(&state.db, &id).await?;
    publish_event(&state, BoardEvent::CardRemoved { card });

    Ok(StatusCode::NO_CONTENT)
}
