//! Pulse Core
//!
//! Platform-agnostic domain types, graph rules, and error handling for Pulse.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `User`, `Post`, `MediaRef` and the opaque `UserId` / `PostId`
//! - **Identity Sets**: `IdSet`, an insertion-ordered set with add-if-absent and
//!   remove-if-present mutations
//! - **Graph Rules**: symmetric follow toggles and like toggles in [`graph`]
//! - **Storage Trait**: `SocialStore`, implemented by `pulse-storage`
//! - **Error Handling**: Unified `PulseError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use pulse_core::graph::{toggle_follow, FollowChange};
//! use pulse_core::types::User;
//!
//! let mut alice = User::new("alice@example.com", "Alice");
//! let mut bob = User::new("bob@example.com", "Bob");
//!
//! let change = toggle_follow(&mut alice, &mut bob).unwrap();
//! assert_eq!(change, FollowChange::Followed);
//! assert!(alice.followings.contains(&bob.id));
//! assert!(bob.followers.contains(&alice.id));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod graph;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{PulseError, Result};
pub use storage::SocialStore;

pub use types::{
    Credentials, IdSet, MediaRef, NewPost, NewUser, Post, PostId, PostView, ProfileUpdate,
    Toggled, User, UserId, UserSummary,
};
