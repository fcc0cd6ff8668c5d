pub mod boards;
pub mod cards;

pub use boards::{
    BoardDetailResponse, CreateBoardRequest, CreateListRequest, ReorderListRequest,
    UpdateBoardRequest, UpdateListRequest,
};
pub use cards::{
    BoardCardsQuery, CardEnvelope, CreateCardRequest, MoveCardRequest, UpdateCardRequest,
};
