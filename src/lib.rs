pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod services;
pub mod sync;
