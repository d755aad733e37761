/// Post lifecycle - create, edit, delete, and the account deletion cascade
use crate::error::{Result, ServerError};
use crate::services::feed::view_post;
use crate::services::media::{MediaHost, POST_IMAGE_FOLDER};
use pulse_core::{NewPost, Post, PostId, PostView, SocialStore, User, UserId};
use serde::Serialize;
use std::sync::Arc;

/// Stages of the account deletion cascade, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CascadeStage {
    DeletePosts,
    DeletePostImage,
    DetachFollower,
    DetachFollowing,
    WithdrawLike,
    DeleteAvatar,
    DeleteUser,
}

/// Result of one cascade step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "camelCase")]
pub enum StepOutcome {
    Done,
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeStep {
    pub stage: CascadeStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub outcome: StepOutcome,
}

/// Everything the cascade attempted for one deleted account
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeReport {
    pub user_id: UserId,
    pub steps: Vec<CascadeStep>,
}

impl CascadeReport {
    fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            steps: Vec::new(),
        }
    }

    fn record(&mut self, stage: CascadeStage, target: Option<String>, outcome: StepOutcome) {
        if let StepOutcome::Failed(reason) = &outcome {
            tracing::warn!(
                user_id = %self.user_id,
                ?stage,
                target = target.as_deref().unwrap_or("-"),
                "Cascade step failed: {}",
                reason
            );
        }
        self.steps.push(CascadeStep {
            stage,
            target,
            outcome,
        });
    }

    fn record_result<E: std::fmt::Display>(
        &mut self,
        stage: CascadeStage,
        target: Option<String>,
        result: std::result::Result<(), E>,
    ) {
        let outcome = match result {
            Ok(()) => StepOutcome::Done,
            Err(e) => StepOutcome::Failed(e.to_string()),
        };
        self.record(stage, target, outcome);
    }

    /// Record a single-id removal; `Ok(false)` means nothing referenced it
    fn record_removal<E: std::fmt::Display>(
        &mut self,
        stage: CascadeStage,
        target: String,
        result: std::result::Result<bool, E>,
    ) {
        let outcome = match result {
            Ok(true) => StepOutcome::Done,
            Ok(false) => StepOutcome::Skipped("already detached".to_string()),
            Err(e) => StepOutcome::Failed(e.to_string()),
        };
        self.record(stage, Some(target), outcome);
    }

    /// Steps that failed
    pub fn failures(&self) -> impl Iterator<Item = &CascadeStep> {
        self.steps
            .iter()
            .filter(|step| matches!(step.outcome, StepOutcome::Failed(_)))
    }

    /// Whether every step succeeded or was skipped
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn SocialStore>,
    media: Arc<dyn MediaHost>,
}

impl PostService {
    pub fn new(store: Arc<dyn SocialStore>, media: Arc<dyn MediaHost>) -> Self {
        Self { store, media }
    }

    async fn load_user(&self, id: &UserId) -> Result<User> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| ServerError::NotFound("User not found".to_string()))
    }

    async fn load_owned_post(&self, actor: &UserId, post_id: &PostId, verb: &str) -> Result<Post> {
        let post = self
            .store
            .get_post(post_id)
            .await?
            .ok_or_else(|| ServerError::NotFound("Post not found".to_string()))?;

        if !post.is_owned_by(actor) {
            return Err(ServerError::Forbidden(format!(
                "Only the owners can {verb} their post"
            )));
        }
        Ok(post)
    }

    /// Upload the image and publish a post for `owner`
    pub async fn create(&self, owner: &UserId, caption: &str, image: &str) -> Result<PostView> {
        if caption.trim().is_empty() || image.trim().is_empty() {
            return Err(ServerError::Validation(
                "Caption and postImg are required".to_string(),
            ));
        }

        let user = self.load_user(owner).await?;
        let image = self.media.upload(image, POST_IMAGE_FOLDER).await?;

        let post = Post::create(
            owner.clone(),
            NewPost {
                caption: caption.to_string(),
                image,
            },
        );

        if let Err(e) = self.store.create_post(&post).await {
            self.discard_image(&post.image.public_id).await;
            return Err(e.into());
        }

        tracing::info!(post_id = %post.id, owner = %owner, "Post created");
        Ok(PostView::for_viewer(&post, user.summary(), owner))
    }

    /// Change a post's caption. A blank caption leaves it unchanged.
    pub async fn update_caption(
        &self,
        actor: &UserId,
        post_id: &PostId,
        caption: Option<&str>,
    ) -> Result<PostView> {
        let mut post = self.load_owned_post(actor, post_id, "update").await?;

        if let Some(caption) = caption.filter(|c| !c.trim().is_empty()) {
            self.store.update_caption(&post.id, caption).await?;
            post.caption = caption.to_string();
        }

        view_post(self.store.as_ref(), &post, actor).await
    }

    /// Delete one of the caller's posts
    pub async fn delete(&self, actor: &UserId, post_id: &PostId) -> Result<()> {
        let post = self.load_owned_post(actor, post_id, "delete").await?;

        self.store.delete_post(&post.id, actor).await?;
        self.discard_image(&post.image.public_id).await;

        tracing::info!(post_id = %post.id, "Post deleted");
        Ok(())
    }

    async fn discard_image(&self, public_id: &str) {
        if let Err(e) = self.media.destroy(public_id).await {
            tracing::warn!(public_id, "Failed to remove media: {}", e);
        }
    }

    /// Delete the caller's account and everything that references it.
    ///
    /// Steps run in a fixed order and each is attempted regardless of earlier
    /// failures. Only a failure to load or delete the user record itself is
    /// returned as an error.
    pub async fn delete_profile(&self, actor: &UserId) -> Result<CascadeReport> {
        let user = self.load_user(actor).await?;
        let mut report = CascadeReport::new(actor.clone());

        // 1. Owned posts and their images
        let owned = match self.store.posts_by_owner(actor).await {
            Ok(posts) => posts,
            Err(e) => {
                report.record(
                    CascadeStage::DeletePosts,
                    None,
                    StepOutcome::Failed(format!("listing posts: {e}")),
                );
                Vec::new()
            }
        };
        match self.store.delete_posts_by_owner(actor).await {
            Ok(0) => report.record(
                CascadeStage::DeletePosts,
                None,
                StepOutcome::Skipped("no posts".to_string()),
            ),
            Ok(_) => report.record(CascadeStage::DeletePosts, None, StepOutcome::Done),
            Err(e) => report.record(
                CascadeStage::DeletePosts,
                None,
                StepOutcome::Failed(e.to_string()),
            ),
        }
        for post in &owned {
            let result = self.media.destroy(&post.image.public_id).await;
            report.record_result(
                CascadeStage::DeletePostImage,
                Some(post.image.public_id.clone()),
                result,
            );
        }

        // 2. and 3. Edges held by followers and followees
        for follower in user.followers.iter() {
            let result = self.store.remove_following(follower, actor).await;
            report.record_removal(CascadeStage::DetachFollower, follower.to_string(), result);
        }
        for followee in user.followings.iter() {
            let result = self.store.remove_follower(followee, actor).await;
            report.record_removal(CascadeStage::DetachFollowing, followee.to_string(), result);
        }

        // 4. Likes on other users' posts
        match self.store.posts_liked_by(actor).await {
            Ok(liked) => {
                for post in liked {
                    let result = self.store.remove_like(&post.id, actor).await;
                    report.record_removal(CascadeStage::WithdrawLike, post.id.to_string(), result);
                }
            }
            Err(e) => report.record(
                CascadeStage::WithdrawLike,
                None,
                StepOutcome::Failed(format!("listing liked posts: {e}")),
            ),
        }

        // 5. Avatar
        if let Some(avatar) = &user.avatar {
            let result = self.media.destroy(&avatar.public_id).await;
            report.record_result(
                CascadeStage::DeleteAvatar,
                Some(avatar.public_id.clone()),
                result,
            );
        }

        // 6. The record itself
        self.store.delete_user(actor).await?;
        report.record(CascadeStage::DeleteUser, None, StepOutcome::Done);

        if report.is_clean() {
            tracing::info!(user_id = %actor, steps = report.steps.len(), "Account deleted");
        } else {
            tracing::warn!(
                user_id = %actor,
                failures = report.failures().count(),
                "Account deleted with failed cleanup steps"
            );
        }

        Ok(report)
    }
}
