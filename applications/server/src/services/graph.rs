/// Social graph service - follow and like toggles
use crate::error::{Result, ServerError};
use crate::services::feed::view_post;
use pulse_core::graph::{ensure_distinct, toggle_follow, toggle_like, FollowChange};
use pulse_core::{PostId, PostView, SocialStore, User, UserId};
use std::sync::Arc;

#[derive(Clone)]
pub struct SocialGraph {
    store: Arc<dyn SocialStore>,
}

impl SocialGraph {
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self { store }
    }

    /// Follow `target` or, if already followed, unfollow.
    ///
    /// Both edge sets are saved in one transaction and nothing else on either
    /// record is written. Two concurrent toggles touching the same user still
    /// race: each reads, flips and writes back the sets, and the last write
    /// wins.
    pub async fn follow_or_unfollow(
        &self,
        actor: &UserId,
        target: &UserId,
    ) -> Result<(User, FollowChange)> {
        ensure_distinct(actor, target)?;

        let mut target_user = self
            .store
            .get_user(target)
            .await?
            .ok_or_else(|| ServerError::NotFound("User to follow not found".to_string()))?;
        let mut actor_user = self
            .store
            .get_user(actor)
            .await?
            .ok_or_else(|| ServerError::NotFound("User not found".to_string()))?;

        let change = toggle_follow(&mut actor_user, &mut target_user)?;
        self.store
            .save_follow_edges(&actor_user, &target_user)
            .await?;

        tracing::debug!(actor = %actor, target = %target, ?change, "Follow toggled");
        Ok((target_user, change))
    }

    /// Like `post_id` or, if already liked, withdraw the like
    pub async fn like_or_unlike(&self, actor: &UserId, post_id: &PostId) -> Result<PostView> {
        let mut post = self
            .store
            .get_post(post_id)
            .await?
            .ok_or_else(|| ServerError::NotFound("Post not found".to_string()))?;

        let toggled = toggle_like(&mut post, actor);
        self.store.save_likes(&post).await?;

        tracing::debug!(actor = %actor, post_id = %post_id, ?toggled, "Like toggled");
        view_post(self.store.as_ref(), &post, actor).await
    }
}
