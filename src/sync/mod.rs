pub mod broadcast;
pub mod locks;
pub mod registry;

pub use broadcast::{Broadcaster, DeliveryStats};
pub use locks::BoardLocks;
pub use registry::{ChannelRegistry, ConnectionId};
