// Declare all modules
pub mod auth;
pub mod config;
pub mod context;
pub mod http;
pub mod notifications;
pub mod resources;
pub mod routing;
pub mod security;
pub mod utils;

// No re-exports here as they're handled in lib.rs
