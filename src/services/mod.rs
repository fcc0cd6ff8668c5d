pub mod board_service;
pub mod card_service;
pub mod list_service;
pub mod move_engine;
pub mod position;

pub use board_service::BoardService;
pub use card_service::CardService;
pub use list_service::ListService;
pub use move_engine::MoveEngine;
pub use position::PositionIndex;
