use sqlx::SqlitePool;

use crate::domain::{Card, List, SyncError};
use crate::services::PositionIndex;

/// Executes one move request end-to-end.
///
/// The destination index is a zero-based slot among the destination list's
/// currently visible, order-sorted cards with the moving card excluded (the
/// frame of reference drag-and-drop frontends report drops in), never a raw
/// order value. Callers hold the board lock across `execute` and the
/// subsequent publish.
pub struct MoveEngine;

impl MoveEngine {
    pub async fn execute(
        pool: &SqlitePool,
        card_id: &str,
        destination_list_id: &str,
        destination_index: usize,
    ) -> Result<Card, SyncError> {
        let mut attempt = 0;
        loop {
            match Self::try_move(pool, card_id, destination_list_id, destination_index).await {
                Err(SyncError::ConcurrentModification(msg)) if attempt == 0 => {
                    tracing::debug!(card_id, %msg, "move conflicted, retrying once");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn try_move(
        pool: &SqlitePool,
        card_id: &str,
        destination_list_id: &str,
        destination_index: usize,
    ) -> Result<Card, SyncError> {
        let mut card: Card = sqlx::query_as("SELECT * FROM cards WHERE id = ?")
            .bind(card_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| SyncError::NotFound(format!("Card not found: {}", card_id)))?;

        let destination: List = sqlx::query_as("SELECT * FROM lists WHERE id = ?")
            .bind(destination_list_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| {
                SyncError::NotFound(format!("List not found: {}", destination_list_id))
            })?;

        if destination.board_id != card.board_id {
            return Err(SyncError::InvalidMove(format!(
                "List {} belongs to a different board",
                destination.id
            )));
        }

        let neighbors =
            Self::neighbors(pool, &destination.id, &card.id, destination_index).await?;

        let position = match position_between(neighbors.0, neighbors.1) {
            Some(position) => position,
            None => {
                PositionIndex::renumber(pool, &destination.id).await?;

                // A same-list renumbering touched the moving card too;
                // refresh it so the guarded write sees the current version.
                card = sqlx::query_as("SELECT * FROM cards WHERE id = ?")
                    .bind(card_id)
                    .fetch_optional(pool)
                    .await?
                    .ok_or_else(|| {
                        SyncError::ConcurrentModification(format!(
                            "Card {} deleted during move",
                            card_id
                        ))
                    })?;

                let neighbors =
                    Self::neighbors(pool, &destination.id, &card.id, destination_index).await?;
                position_between(neighbors.0, neighbors.1).ok_or_else(|| {
                    SyncError::Internal(format!(
                        "No open slot in list {} after renumbering",
                        destination.id
                    ))
                })?
            }
        };

        let moved = PositionIndex::set_position(pool, &card, &destination, position).await?;

        tracing::info!(
            card_id,
            list_id = destination.id.as_str(),
            position,
            "card moved"
        );

        Ok(moved)
    }

    async fn neighbors(
        pool: &SqlitePool,
        list_id: &str,
        moving_card_id: &str,
        index: usize,
    ) -> Result<(Option<f64>, Option<f64>), SyncError> {
        let mut snapshot = PositionIndex::list_cards(pool, list_id).await?;
        snapshot.retain(|c| c.id != moving_card_id);

        // Indices past the end clamp to append.
        let index = index.min(snapshot.len());
        let before = index.checked_sub(1).map(|i| snapshot[i].position);
        let after = snapshot.get(index).map(|c| c.position);

        Ok((before, after))
    }
}

/// Order value strictly between two neighbors: the arithmetic midpoint, the
/// open interval below the head, or above the tail; 0 for an empty list.
/// None means the neighbors admit no representable distinct midpoint and the
/// list needs renumbering.
pub fn position_between(before: Option<f64>, after: Option<f64>) -> Option<f64> {
    match (before, after) {
        (None, None) => Some(0.0),
        (None, Some(hi)) => Some(hi - 1.0),
        (Some(lo), None) => Some(lo + 1.0),
        (Some(lo), Some(hi)) => {
            let mid = lo + (hi - lo) / 2.0;
            (mid > lo && mid < hi).then_some(mid)
        }
    }
}
