use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub board_id: String,
    pub list_id: String,
    pub title: String,
    pub description: String,
    pub position: f64,
    pub priority: String,
    pub due_date: Option<String>,
    pub is_completed: bool,
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl Card {
    /// Display ordering within a list: position, with equal positions
    /// (defensive case) tie-broken on creation time, then id.
    pub fn display_order(a: &Card, b: &Card) -> Ordering {
        a.position
            .partial_cmp(&b.position)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    }
}
