//! Storage trait for users, posts and their edges

use crate::error::Result;
use crate::types::{Credentials, NewUser, Post, PostId, User, UserId};
use async_trait::async_trait;

/// Persistent store for the social graph
///
/// Records are document-shaped: a user carries its post list and both edge
/// sets, a post carries its like set. Every write touches only the fields it
/// names, so editing a profile or publishing a post never overwrites an edge
/// set that changed since the record was loaded. Methods that touch two
/// records persist them atomically.
///
/// Toggles load an edge or like set, flip it with [`crate::graph`] and write
/// the whole set back. There is no optimistic concurrency control on those
/// sets: two toggles that load the same set race, and the last write wins.
#[async_trait]
pub trait SocialStore: Send + Sync {
    // ========================================================================
    // Users
    // ========================================================================

    /// Register a user. Fails with `Duplicate` if the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// Get user by ID
    async fn get_user(&self, id: &UserId) -> Result<Option<User>>;

    /// Get several users; unknown ids are skipped, order follows `ids`
    async fn get_users(&self, ids: &[UserId]) -> Result<Vec<User>>;

    /// Look up login material by email
    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>>;

    /// All users, oldest first
    async fn list_users(&self) -> Result<Vec<User>>;

    /// All users whose id is not in `excluded`, oldest first
    async fn list_users_excluding(&self, excluded: &[UserId]) -> Result<Vec<User>>;

    /// Overwrite a user's name, bio and avatar
    async fn save_profile(&self, user: &User) -> Result<()>;

    /// Overwrite the `followers` and `followings` sets of two users in one
    /// transaction (both sides of a follow edge)
    async fn save_follow_edges(&self, first: &User, second: &User) -> Result<()>;

    /// Remove `followee` from `user.followings`. Returns `false` if there was
    /// nothing to remove.
    async fn remove_following(&self, user: &UserId, followee: &UserId) -> Result<bool>;

    /// Remove `follower` from `user.followers`. Returns `false` if there was
    /// nothing to remove.
    async fn remove_follower(&self, user: &UserId, follower: &UserId) -> Result<bool>;

    /// Delete a user record
    async fn delete_user(&self, id: &UserId) -> Result<()>;

    // ========================================================================
    // Posts
    // ========================================================================

    /// Insert `post` and append its id to its owner's post list in one
    /// transaction
    async fn create_post(&self, post: &Post) -> Result<()>;

    /// Get post by ID
    async fn get_post(&self, id: &PostId) -> Result<Option<Post>>;

    /// Overwrite a post's caption
    async fn update_caption(&self, id: &PostId, caption: &str) -> Result<()>;

    /// Overwrite a post's like set
    async fn save_likes(&self, post: &Post) -> Result<()>;

    /// Remove `user` from the like set of post `id`. Returns `false` if there
    /// was nothing to remove.
    async fn remove_like(&self, id: &PostId, user: &UserId) -> Result<bool>;

    /// Delete post `id` and drop it from `owner`'s post list in one
    /// transaction
    async fn delete_post(&self, id: &PostId, owner: &UserId) -> Result<()>;

    /// Delete every post owned by `owner`, returning how many were removed
    async fn delete_posts_by_owner(&self, owner: &UserId) -> Result<u64>;

    /// Posts owned by any of `owners`, oldest first
    async fn posts_by_owners(&self, owners: &[UserId]) -> Result<Vec<Post>>;

    /// Posts whose like set contains `user`
    async fn posts_liked_by(&self, user: &UserId) -> Result<Vec<Post>>;

    /// Convenience alias for a single owner
    async fn posts_by_owner(&self, owner: &UserId) -> Result<Vec<Post>> {
        self.posts_by_owners(std::slice::from_ref(owner)).await
    }
}
