use sqlx::SqlitePool;

use crate::domain::SyncError;

/// Board-level authorization: may this caller act on this board?
///
/// Answered from the board's owner column and the board_members table.
/// Invoked before any move/create/delete is accepted and before a channel
/// join; never inside the per-board exclusion scope.
pub struct BoardAccess;

impl BoardAccess {
    pub async fn assert_member(
        pool: &SqlitePool,
        user_id: &str,
        board_id: &str,
    ) -> Result<(), SyncError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT owner_id FROM boards WHERE id = ?")
            .bind(board_id)
            .fetch_optional(pool)
            .await?;

        let owner_id = match row {
            Some((owner_id,)) => owner_id,
            None => return Err(SyncError::NotFound(format!("Board not found: {}", board_id))),
        };

        if owner_id == user_id {
            return Ok(());
        }

        let member: Option<(String,)> = sqlx::query_as(
            "SELECT user_id FROM board_members WHERE board_id = ? AND user_id = ?",
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        if member.is_some() {
            Ok(())
        } else {
            Err(SyncError::Forbidden(format!(
                "No access to board {}",
                board_id
            )))
        }
    }
}
