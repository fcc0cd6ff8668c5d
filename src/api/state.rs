use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::sync::{BoardLocks, Broadcaster, ChannelRegistry};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub registry: Arc<ChannelRegistry>,
    pub broadcaster: Arc<Broadcaster>,
    pub board_locks: Arc<BoardLocks>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: Arc<Config>) -> Self {
        let registry = Arc::new(ChannelRegistry::new());
        let broadcaster = Arc::new(Broadcaster::new(registry.clone()));

        Self {
            db,
            registry,
            broadcaster,
            board_locks: Arc::new(BoardLocks::new()),
            config,
        }
    }
}
