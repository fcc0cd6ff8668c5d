use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::api::dto::{CreateListRequest, ReorderListRequest, UpdateListRequest};
use crate::domain::{List, SyncError};

pub struct ListService;

impl ListService {
    pub async fn create_list(
        pool: &SqlitePool,
        board_id: &str,
        req: CreateListRequest,
    ) -> Result<List, SyncError> {
        if req.name.trim().is_empty() {
            return Err(SyncError::Validation("List name is required".into()));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let color = req.color.unwrap_or_else(|| "#6B7280".into());

        let max_pos: Option<f64> =
            sqlx::query_scalar("SELECT MAX(position) FROM lists WHERE board_id = ?")
                .bind(board_id)
                .fetch_one(pool)
                .await?;
        let position = max_pos.map(|p| p + 1.0).unwrap_or(0.0);

        sqlx::query(
            "INSERT INTO lists (id, board_id, name, color, position, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(board_id)
        .bind(req.name.trim())
        .bind(&color)
        .bind(position)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await?;

        Self::get_list(pool, &id).await
    }

    pub async fn get_list(pool: &SqlitePool, id: &str) -> Result<List, SyncError> {
        let list: List = sqlx::query_as("SELECT * FROM lists WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| SyncError::NotFound(format!("List not found: {}", id)))?;

        Ok(list)
    }

    /// Lists of a board in column display order.
    pub async fn board_lists(pool: &SqlitePool, board_id: &str) -> Result<Vec<List>, SyncError> {
        let lists: Vec<List> = sqlx::query_as(
            "SELECT * FROM lists WHERE board_id = ? ORDER BY position ASC, created_at ASC, id ASC",
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        Ok(lists)
    }

    pub async fn update_list(
        pool: &SqlitePool,
        id: &str,
        req: UpdateListRequest,
    ) -> Result<List, SyncError> {
        let existing = Self::get_list(pool, id).await?;

        let name = req.name.unwrap_or(existing.name);
        if name.trim().is_empty() {
            return Err(SyncError::Validation("List name is required".into()));
        }
        let color = req.color.unwrap_or(existing.color);

        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE lists SET name = ?, color = ?, updated_at = ? WHERE id = ?")
            .bind(name.trim())
            .bind(&color)
            .bind(&now)
            .bind(id)
            .execute(pool)
            .await?;

        Self::get_list(pool, id).await
    }

    pub async fn reorder_list(
        pool: &SqlitePool,
        id: &str,
        req: ReorderListRequest,
    ) -> Result<List, SyncError> {
        let _existing = Self::get_list(pool, id).await?;

        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE lists SET position = ?, updated_at = ? WHERE id = ?")
            .bind(req.position)
            .bind(&now)
            .bind(id)
            .execute(pool)
            .await?;

        Self::get_list(pool, id).await
    }

    /// Deletes the list and all of its cards: an explicit cascade in one
    /// transaction, not a foreign-key side effect. Returns the removed list
    /// for the event payload.
    pub async fn delete_list(pool: &SqlitePool, id: &str) -> Result<List, SyncError> {
        let list = Self::get_list(pool, id).await?;

        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM cards WHERE list_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM lists WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(list)
    }
}
