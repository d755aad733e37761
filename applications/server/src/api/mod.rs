/// API route modules
pub mod auth;
pub mod health;
pub mod posts;
pub mod response;
pub mod users;

pub use response::{ApiJson, Envelope};
