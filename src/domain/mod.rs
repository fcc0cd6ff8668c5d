pub mod board;
pub mod card;
pub mod error;
pub mod event;
pub mod priority;

pub use board::{Board, List};
pub use card::Card;
pub use error::SyncError;
pub use event::BoardEvent;
pub use priority::Priority;
