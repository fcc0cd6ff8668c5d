use serde::{Deserialize, Serialize};

use crate::domain::{Card, List};

/// A committed state change, broadcast to every observer of the affected
/// board. Variants carry the complete resulting record, never a diff, so a
/// client can converge by taking the latest event at face value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BoardEvent {
    CardAdded { card: Card },
    CardModified { card: Card },
    CardRemoved { card: Card },
    ListAdded { list: List },
    ListModified { list: List },
    ListRemoved { list: List },
}

impl BoardEvent {
    pub fn board_id(&self) -> &str {
        match self {
            BoardEvent::CardAdded { card }
            | BoardEvent::CardModified { card }
            | BoardEvent::CardRemoved { card } => &card.board_id,
            BoardEvent::ListAdded { list }
            | BoardEvent::ListModified { list }
            | BoardEvent::ListRemoved { list } => &list.board_id,
        }
    }
}
