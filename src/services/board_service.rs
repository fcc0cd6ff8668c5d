use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::api::dto::{CreateBoardRequest, UpdateBoardRequest};
use crate::domain::{Board, SyncError};

/// Columns every new board starts with, matching the classic three-column
/// flow. Orders 0, 1, 2.
const DEFAULT_LISTS: &[(&str, &str)] = &[
    ("To Do", "#EF4444"),
    ("Doing", "#F59E0B"),
    ("Done", "#10B981"),
];

pub struct BoardService;

impl BoardService {
    pub async fn create_board(
        pool: &SqlitePool,
        owner_id: &str,
        req: CreateBoardRequest,
    ) -> Result<Board, SyncError> {
        if req.name.trim().is_empty() {
            return Err(SyncError::Validation("Board name is required".into()));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let description = req.description.unwrap_or_default();
        let background = req.background.unwrap_or_else(|| "#FFFFFF".into());

        let mut tx = pool.begin().await?;

        sqlx::query(
            "INSERT INTO boards (id, name, description, owner_id, background, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(req.name.trim())
        .bind(&description)
        .bind(owner_id)
        .bind(&background)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        for (index, (name, color)) in DEFAULT_LISTS.iter().enumerate() {
            sqlx::query(
                "INSERT INTO lists (id, board_id, name, color, position, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&id)
            .bind(name)
            .bind(color)
            .bind(index as f64)
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Self::get_board(pool, &id).await
    }

    pub async fn get_board(pool: &SqlitePool, id: &str) -> Result<Board, SyncError> {
        let board: Board = sqlx::query_as("SELECT * FROM boards WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| SyncError::NotFound(format!("Board not found: {}", id)))?;

        Ok(board)
    }

    /// Boards the caller owns or is a member of.
    pub async fn boards_for_user(
        pool: &SqlitePool,
        user_id: &str,
    ) -> Result<Vec<Board>, SyncError> {
        let boards: Vec<Board> = sqlx::query_as(
            "SELECT b.* FROM boards b \
             LEFT JOIN board_members m ON m.board_id = b.id AND m.user_id = ? \
             WHERE b.owner_id = ? OR m.user_id IS NOT NULL \
             ORDER BY b.created_at ASC",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(boards)
    }

    pub async fn update_board(
        pool: &SqlitePool,
        id: &str,
        req: UpdateBoardRequest,
    ) -> Result<Board, SyncError> {
        let existing = Self::get_board(pool, id).await?;

        let name = req.name.unwrap_or(existing.name);
        if name.trim().is_empty() {
            return Err(SyncError::Validation("Board name is required".into()));
        }
        let description = req.description.unwrap_or(existing.description);
        let background = req.background.unwrap_or(existing.background);

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE boards SET name = ?, description = ?, background = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(name.trim())
        .bind(&description)
        .bind(&background)
        .bind(&now)
        .bind(id)
        .execute(pool)
        .await?;

        Self::get_board(pool, id).await
    }

    /// Deletes the board with its lists, cards and memberships: explicit
    /// cascade in one transaction.
    pub async fn delete_board(pool: &SqlitePool, id: &str) -> Result<(), SyncError> {
        let _board = Self::get_board(pool, id).await?;

        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM cards WHERE board_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM lists WHERE board_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM board_members WHERE board_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM boards WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
