use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::api::dto::{CreateCardRequest, UpdateCardRequest};
use crate::domain::{Card, List, Priority, SyncError};
use crate::services::PositionIndex;

pub struct CardService;

impl CardService {
    pub async fn create_card(
        pool: &SqlitePool,
        req: CreateCardRequest,
    ) -> Result<Card, SyncError> {
        if req.title.trim().is_empty() {
            return Err(SyncError::Validation("Card title is required".into()));
        }

        let priority = req.priority.unwrap_or_else(|| "medium".into());
        priority
            .parse::<Priority>()
            .map_err(SyncError::Validation)?;

        let list: List = sqlx::query_as("SELECT * FROM lists WHERE id = ?")
            .bind(&req.list_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| SyncError::NotFound(format!("List not found: {}", req.list_id)))?;

        if list.board_id != req.board_id {
            return Err(SyncError::Validation(format!(
                "List {} does not belong to board {}",
                req.list_id, req.board_id
            )));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let description = req.description.unwrap_or_default();
        let position = PositionIndex::append_order(pool, &req.list_id).await?;

        sqlx::query(
            "INSERT INTO cards (id, board_id, list_id, title, description, position, priority, \
             due_date, is_completed, version, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, 0, ?, ?)",
        )
        .bind(&id)
        .bind(&req.board_id)
        .bind(&req.list_id)
        .bind(req.title.trim())
        .bind(&description)
        .bind(position)
        .bind(&priority)
        .bind(&req.due_date)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await?;

        Self::get_card(pool, &id).await
    }

    pub async fn get_card(pool: &SqlitePool, id: &str) -> Result<Card, SyncError> {
        let card: Card = sqlx::query_as("SELECT * FROM cards WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| SyncError::NotFound(format!("Card not found: {}", id)))?;

        Ok(card)
    }

    /// All cards of a board in display order, grouped by list.
    pub async fn board_cards(pool: &SqlitePool, board_id: &str) -> Result<Vec<Card>, SyncError> {
        let cards: Vec<Card> = sqlx::query_as(
            "SELECT * FROM cards WHERE board_id = ? \
             ORDER BY list_id ASC, position ASC, created_at ASC, id ASC",
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        Ok(cards)
    }

    pub async fn update_card(
        pool: &SqlitePool,
        id: &str,
        req: UpdateCardRequest,
    ) -> Result<Card, SyncError> {
        let existing = Self::get_card(pool, id).await?;

        let title = req.title.unwrap_or(existing.title);
        if title.trim().is_empty() {
            return Err(SyncError::Validation("Card title is required".into()));
        }
        let description = req.description.unwrap_or(existing.description);
        let priority = req.priority.unwrap_or(existing.priority);
        priority
            .parse::<Priority>()
            .map_err(SyncError::Validation)?;
        let due_date = match req.due_date {
            Some(value) => value,
            None => existing.due_date,
        };

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE cards SET title = ?, description = ?, priority = ?, due_date = ?, \
             version = version + 1, updated_at = ? WHERE id = ?",
        )
        .bind(title.trim())
        .bind(&description)
        .bind(&priority)
        .bind(&due_date)
        .bind(&now)
        .bind(id)
        .execute(pool)
        .await?;

        Self::get_card(pool, id).await
    }

    pub async fn toggle_complete(pool: &SqlitePool, id: &str) -> Result<Card, SyncError> {
        let existing = Self::get_card(pool, id).await?;

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE cards SET is_completed = ?, version = version + 1, updated_at = ? WHERE id = ?",
        )
        .bind(!existing.is_completed)
        .bind(&now)
        .bind(id)
        .execute(pool)
        .await?;

        Self::get_card(pool, id).await
    }

    /// Deletes the card and returns its final state for the removal event.
    /// No compaction of the remaining cards' positions.
    pub async fn delete_card(pool: &SqlitePool, id: &str) -> Result<Card, SyncError> {
        let card = Self::get_card(pool, id).await?;

        sqlx::query("DELETE FROM cards WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(card)
    }
}
