/// Feed assembly and post read models
use crate::error::{Result, ServerError};
use pulse_core::{IdSet, Post, PostView, SocialStore, User, UserId, UserSummary};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedData {
    pub followings: Vec<UserSummary>,
    pub suggestions: Vec<UserSummary>,
    pub posts: Vec<PostView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user: User,
    pub posts: Vec<PostView>,
}

/// Map `posts` (oldest first) for `viewer`, newest first.
///
/// Posts whose owner record no longer exists are dropped.
pub(crate) async fn newest_first(
    store: &dyn SocialStore,
    posts: Vec<Post>,
    viewer: &UserId,
) -> Result<Vec<PostView>> {
    let owner_ids: IdSet<UserId> = posts.iter().map(|post| post.owner.clone()).collect();
    let owners: HashMap<UserId, UserSummary> = store
        .get_users(owner_ids.as_slice())
        .await?
        .into_iter()
        .map(|user| (user.id.clone(), user.summary()))
        .collect();

    Ok(posts
        .iter()
        .rev()
        .filter_map(|post| {
            owners
                .get(&post.owner)
                .map(|owner| PostView::for_viewer(post, owner.clone(), viewer))
        })
        .collect())
}

/// Map a single post for `viewer`
pub(crate) async fn view_post(
    store: &dyn SocialStore,
    post: &Post,
    viewer: &UserId,
) -> Result<PostView> {
    let owner = store
        .get_user(&post.owner)
        .await?
        .ok_or_else(|| ServerError::NotFound("Post owner not found".to_string()))?;

    Ok(PostView::for_viewer(post, owner.summary(), viewer))
}

#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn SocialStore>,
}

impl FeedService {
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self { store }
    }

    async fn load_user(&self, id: &UserId) -> Result<User> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| ServerError::NotFound("User not found".to_string()))
    }

    /// Posts of followed users, the followed users, and everyone else as suggestions
    pub async fn get_feed(&self, actor: &UserId) -> Result<FeedData> {
        let user = self.load_user(actor).await?;
        let followed = user.followings.as_slice();

        let followings = self
            .store
            .get_users(followed)
            .await?
            .iter()
            .map(User::summary)
            .collect();

        let posts = self.store.posts_by_owners(followed).await?;
        let posts = newest_first(self.store.as_ref(), posts, actor).await?;

        let mut excluded = followed.to_vec();
        excluded.push(actor.clone());
        let suggestions = self
            .store
            .list_users_excluding(&excluded)
            .await?
            .iter()
            .map(User::summary)
            .collect();

        Ok(FeedData {
            followings,
            suggestions,
            posts,
        })
    }

    /// Another user's record and posts, as seen by `viewer`
    pub async fn get_user_profile(
        &self,
        user_id: Option<&UserId>,
        viewer: &UserId,
    ) -> Result<UserProfile> {
        let user_id =
            user_id.ok_or_else(|| ServerError::Validation("userId is required".to_string()))?;
        let user = self.load_user(user_id).await?;
        let posts = self.store.posts_by_owner(user_id).await?;
        let posts = newest_first(self.store.as_ref(), posts, viewer).await?;

        Ok(UserProfile { user, posts })
    }

    /// The caller's own posts
    pub async fn my_posts(&self, actor: &UserId) -> Result<Vec<PostView>> {
        let posts = self.store.posts_by_owner(actor).await?;
        newest_first(self.store.as_ref(), posts, actor).await
    }

    /// Posts of any user
    pub async fn user_posts(
        &self,
        user_id: Option<&UserId>,
        viewer: &UserId,
    ) -> Result<Vec<PostView>> {
        let user_id =
            user_id.ok_or_else(|| ServerError::Validation("userId is required".to_string()))?;
        let posts = self.store.posts_by_owner(user_id).await?;
        newest_first(self.store.as_ref(), posts, viewer).await
    }
}
