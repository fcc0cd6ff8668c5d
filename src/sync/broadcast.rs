use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::domain::{BoardEvent, SyncError};
use crate::sync::ChannelRegistry;

/// Snapshot of delivery counters.
#[derive(Debug, Clone, Default)]
pub struct DeliveryStats {
    pub events_published: u64,
    pub deliveries_dropped: u64,
}

/// Fans committed events out to every observer of the affected board.
///
/// Delivery is best-effort and non-persistent: an event is serialized once
/// and pushed into each observer's unbounded outbound queue. A client that
/// was disconnected never receives events it missed and reconciles via a
/// full refetch on reconnect. Publishing never blocks the committing request
/// and delivery failures are never surfaced to it.
///
/// Per-board ordering: callers publish before releasing the board's
/// exclusion scope, so observers see events in commit order. No ordering is
/// guaranteed across boards.
pub struct Broadcaster {
    registry: Arc<ChannelRegistry>,
    events_published: AtomicU64,
    deliveries_dropped: AtomicU64,
}

impl Broadcaster {
    pub fn new(registry: Arc<ChannelRegistry>) -> Self {
        Self {
            registry,
            events_published: AtomicU64::new(0),
            deliveries_dropped: AtomicU64::new(0),
        }
    }

    /// Delivers `event` to every connection currently registered for its
    /// board. Returns the number of observers reached.
    pub fn publish(&self, event: &BoardEvent) -> Result<usize, SyncError> {
        let payload = serde_json::to_string(event)?;
        let board_id = event.board_id();

        let mut delivered = 0;
        for (connection_id, tx) in self.registry.observers_of(board_id) {
            if tx.send(payload.clone()).is_ok() {
                delivered += 1;
            } else {
                // Receiver task already gone: half-open socket or timed-out
                // peer. Prune so the registry never leaks the entry.
                self.deliveries_dropped.fetch_add(1, Ordering::Relaxed);
                self.registry.disconnect(connection_id);
            }
        }

        self.events_published.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(board_id, delivered, "event published");

        Ok(delivered)
    }

    pub fn stats(&self) -> DeliveryStats {
        DeliveryStats {
            events_published: self.events_published.load(Ordering::Relaxed),
            deliveries_dropped: self.deliveries_dropped.load(Ordering::Relaxed),
        }
    }
}
