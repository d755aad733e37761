/// Post API routes
use crate::{
    api::{ApiJson, Envelope},
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    state::AppState,
};
use axum::{extract::State, http::StatusCode};
use pulse_core::{PostId, PostView};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub caption: Option<String>,
    pub post_img: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostIdRequest {
    pub post_id: Option<PostId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub post_id: Option<PostId>,
    pub caption: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub post: PostView,
}

fn require_post_id(post_id: Option<PostId>) -> Result<PostId> {
    post_id.ok_or_else(|| ServerError::Validation("postId is required".to_string()))
}

/// POST /posts
pub async fn create_post(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(req): ApiJson<CreatePostRequest>,
) -> Result<Envelope<PostResponse>> {
    let post = app_state
        .posts
        .create(
            user.user_id(),
            req.caption.as_deref().unwrap_or_default(),
            req.post_img.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Envelope::data(StatusCode::CREATED, PostResponse { post }))
}

/// POST /posts/like
pub async fn like_post(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(req): ApiJson<PostIdRequest>,
) -> Result<Envelope<PostResponse>> {
    let post_id = require_post_id(req.post_id)?;
    let post = app_state
        .graph
        .like_or_unlike(user.user_id(), &post_id)
        .await?;

    Ok(Envelope::ok(PostResponse { post }))
}

/// PUT /posts
pub async fn update_post(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(req): ApiJson<UpdatePostRequest>,
) -> Result<Envelope<PostResponse>> {
    let post_id = require_post_id(req.post_id)?;
    let post = app_state
        .posts
        .update_caption(user.user_id(), &post_id, req.caption.as_deref())
        .await?;

    Ok(Envelope::ok(PostResponse { post }))
}

/// DELETE /posts
pub async fn delete_post(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(req): ApiJson<PostIdRequest>,
) -> Result<Envelope> {
    let post_id = require_post_id(req.post_id)?;
    app_state.posts.delete(user.user_id(), &post_id).await?;

    Ok(Envelope::message(StatusCode::OK, "Post deleted successfully"))
}
