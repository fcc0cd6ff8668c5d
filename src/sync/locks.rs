use std::collections::HashMap;
use std::sync::Mutex as StdMutex;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Keyed per-board exclusion scope.
///
/// Order-value computation and commit for requests touching the same board
/// are linearized by holding the board's mutex across read-compute-write of
/// the position index plus the event publish. Requests against different
/// boards proceed fully in parallel. Authorization and validation run before
/// the lock is taken.
#[derive(Default)]
pub struct BoardLocks {
    inner: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl BoardLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, board_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().expect("board lock map poisoned");
            map.entry(board_id.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_board_serializes() {
        let locks = Arc::new(BoardLocks::new());

        let guard = locks.acquire("b1").await;

        let locks2 = locks.clone();
        let contender = tokio::spawn(async move {
            let _g = locks2.acquire("b1").await;
        });

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn different_boards_independent() {
        let locks = BoardLocks::new();
        let _g1 = locks.acquire("b1").await;
        // Must not deadlock.
        let _g2 = locks.acquire("b2").await;
    }
}
