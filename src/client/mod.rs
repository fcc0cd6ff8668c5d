pub mod replica;

pub use replica::{BoardReplica, MoveTicket};
