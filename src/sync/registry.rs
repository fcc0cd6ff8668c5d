use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use tokio::sync::mpsc;
use uuid::Uuid;

pub type ConnectionId = Uuid;

struct ConnectionEntry {
    tx: mpsc::UnboundedSender<String>,
    boards: HashSet<String>,
}

#[derive(Default)]
struct Inner {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    observers: HashMap<String, HashSet<ConnectionId>>,
}

/// Maps connections to the board(s) they currently observe.
///
/// Explicit service with defined construction and teardown, held in AppState
/// behind an Arc and exposed only through register/join/leave/disconnect.
/// Mutated under its own lock, independent of the board locks, so no critical
/// section ever spans both.
#[derive(Default)]
pub struct ChannelRegistry {
    inner: RwLock<Inner>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a connection's outbound channel. Must be called once per
    /// socket before any join.
    pub fn register(&self, connection_id: ConnectionId, tx: mpsc::UnboundedSender<String>) {
        let mut inner = self.inner.write().expect("registry poisoned");
        inner.connections.insert(
            connection_id,
            ConnectionEntry {
                tx,
                boards: HashSet::new(),
            },
        );
    }

    /// Registers observation of a board. A connection already observing
    /// another board is implicitly removed from it first: one observed board
    /// per connection in the common flow, unlimited observers per board.
    pub fn join(&self, connection_id: ConnectionId, board_id: &str) {
        let mut inner = self.inner.write().expect("registry poisoned");

        let previous = match inner.connections.get_mut(&connection_id) {
            Some(entry) => {
                let previous: Vec<String> = entry.boards.drain().collect();
                entry.boards.insert(board_id.to_string());
                previous
            }
            None => return,
        };

        for old_board in previous {
            if let Some(set) = inner.observers.get_mut(&old_board) {
                set.remove(&connection_id);
                if set.is_empty() {
                    inner.observers.remove(&old_board);
                }
            }
        }

        inner
            .observers
            .entry(board_id.to_string())
            .or_default()
            .insert(connection_id);
    }

    /// Idempotent removal of one observation.
    pub fn leave(&self, connection_id: ConnectionId, board_id: &str) {
        let mut inner = self.inner.write().expect("registry poisoned");

        if let Some(entry) = inner.connections.get_mut(&connection_id) {
            entry.boards.remove(board_id);
        }
        if let Some(set) = inner.observers.get_mut(board_id) {
            set.remove(&connection_id);
            if set.is_empty() {
                inner.observers.remove(board_id);
            }
        }
    }

    /// Removes the connection from every board it observed and drops its
    /// sender. Called on every transport closure, normal or abnormal.
    pub fn disconnect(&self, connection_id: ConnectionId) {
        let mut inner = self.inner.write().expect("registry poisoned");

        let boards = match inner.connections.remove(&connection_id) {
            Some(entry) => entry.boards,
            None => return,
        };

        for board_id in boards {
            if let Some(set) = inner.observers.get_mut(&board_id) {
                set.remove(&connection_id);
                if set.is_empty() {
                    inner.observers.remove(&board_id);
                }
            }
        }
    }

    /// Snapshot of the outbound senders currently observing a board.
    pub fn observers_of(
        &self,
        board_id: &str,
    ) -> Vec<(ConnectionId, mpsc::UnboundedSender<String>)> {
        let inner = self.inner.read().expect("registry poisoned");

        let Some(ids) = inner.observers.get(board_id) else {
            return Vec::new();
        };

        ids.iter()
            .filter_map(|id| {
                inner
                    .connections
                    .get(id)
                    .map(|entry| (*id, entry.tx.clone()))
            })
            .collect()
    }

    pub fn observer_count(&self, board_id: &str) -> usize {
        let inner = self.inner.read().expect("registry poisoned");
        inner.observers.get(board_id).map_or(0, HashSet::len)
    }

    pub fn connection_count(&self) -> usize {
        let inner = self.inner.read().expect("registry poisoned");
        inner.connections.len()
    }
}
