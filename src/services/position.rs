use chrono::Utc;
use sqlx::SqlitePool;

use crate::domain::{Card, List, SyncError};

/// Authoritative per-list card ordering.
///
/// Order values are densely ordered f64 slots, not array indices: writing a
/// card's position never shifts any other card. Callers serialize mutations
/// per board through `BoardLocks`; the queries here stay lock-free.
pub struct PositionIndex;

impl PositionIndex {
    /// Order value that sorts a new card last in the list: current max + 1,
    /// or 0 for an empty list. Callers hold the board lock so two concurrent
    /// creates in one list never receive equal values.
    pub async fn append_order(pool: &SqlitePool, list_id: &str) -> Result<f64, SyncError> {
        let max_pos: Option<f64> =
            sqlx::query_scalar("SELECT MAX(position) FROM cards WHERE list_id = ?")
                .bind(list_id)
                .fetch_one(pool)
                .await?;

        Ok(max_pos.map(|p| p + 1.0).unwrap_or(0.0))
    }

    /// Cards of a list in display order. Equal positions (defensive case)
    /// tie-break on creation time, then id.
    pub async fn list_cards(pool: &SqlitePool, list_id: &str) -> Result<Vec<Card>, SyncError> {
        let cards: Vec<Card> = sqlx::query_as(
            "SELECT * FROM cards WHERE list_id = ? ORDER BY position ASC, created_at ASC, id ASC",
        )
        .bind(list_id)
        .fetch_all(pool)
        .await?;

        Ok(cards)
    }

    /// Overwrites the card's (list_id, position) pair in one atomic write,
    /// guarded by the card's version. Rejects a destination list on a
    /// different board. Fails with ConcurrentModification if the card was
    /// mutated since `card` was read.
    pub async fn set_position(
        pool: &SqlitePool,
        card: &Card,
        destination: &List,
        position: f64,
    ) -> Result<Card, SyncError> {
        if destination.board_id != card.board_id {
            return Err(SyncError::InvalidMove(format!(
                "List {} belongs to a different board",
                destination.id
            )));
        }

        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE cards SET list_id = ?, position = ?, version = version + 1, updated_at = ? \
             WHERE id = ? AND version = ?",
        )
        .bind(&destination.id)
        .bind(position)
        .bind(&now)
        .bind(&card.id)
        .bind(card.version)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(SyncError::ConcurrentModification(format!(
                "Card {} changed since read",
                card.id
            )));
        }

        let updated: Card = sqlx::query_as("SELECT * FROM cards WHERE id = ?")
            .bind(&card.id)
            .fetch_one(pool)
            .await?;

        Ok(updated)
    }

    /// Reassigns 0, 1, 2, … to the list's cards in their current sorted
    /// sequence. Relative order is preserved exactly; only the numeric slots
    /// change. Runs in one transaction.
    pub async fn renumber(pool: &SqlitePool, list_id: &str) -> Result<(), SyncError> {
        let mut tx = pool.begin().await?;

        let ids: Vec<(String,)> = sqlx::query_as(
            "SELECT id FROM cards WHERE list_id = ? ORDER BY position ASC, created_at ASC, id ASC",
        )
        .bind(list_id)
        .fetch_all(&mut *tx)
        .await?;

        let now = Utc::now().to_rfc3339();
        for (index, (id,)) in ids.iter().enumerate() {
            sqlx::query(
                "UPDATE cards SET position = ?, version = version + 1, updated_at = ? WHERE id = ?",
            )
            .bind(index as f64)
            .bind(&now)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(list_id, cards = ids.len(), "list renumbered");
        Ok(())
    }
}
