/// Server services
pub mod accounts;
pub mod auth;
pub mod feed;
pub mod graph;
pub mod media;
pub mod posts;

pub use accounts::{AccountService, SessionTokens};
pub use auth::{AuthService, TokenSettings};
pub use feed::{FeedData, FeedService, UserProfile};
pub use graph::SocialGraph;
pub use media::{LocalMediaHost, MediaHost};
pub use posts::{CascadeReport, PostService};
