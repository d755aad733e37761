//! Pulse Server Library
//!
//! Social media backend: accounts and session tokens, posts, like and follow
//! toggles, feeds, and account deletion with cleanup of every reference.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod router;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use router::create_router;
pub use services::{auth::AuthService, media::MediaHost};
pub use state::AppState;
