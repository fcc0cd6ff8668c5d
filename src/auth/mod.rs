pub mod access;
pub mod jwt;
pub mod middleware;

pub use access::BoardAccess;
pub use middleware::AuthUser;
