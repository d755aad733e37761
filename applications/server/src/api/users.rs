/// User API routes - follow graph, feed, profiles
use crate::{
    api::{ApiJson, Envelope},
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    services::{CascadeReport, FeedData, UserProfile},
    state::AppState,
};
use axum::{
    extract::{Query, State},
    http::header,
    response::{AppendHeaders, IntoResponse},
};
use pulse_core::{PostView, User, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub user_id_to_follow: Option<UserId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdRequest {
    pub user_id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub user_img: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct PostsResponse {
    pub posts: Vec<PostView>,
}

#[derive(Debug, Serialize)]
pub struct DeleteProfileResponse {
    pub report: CascadeReport,
}

/// POST /users/follow
///
/// Follows the target, or unfollows if already followed. Returns the target.
pub async fn follow(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(req): ApiJson<FollowRequest>,
) -> Result<Envelope<UserResponse>> {
    let target = req
        .user_id_to_follow
        .ok_or_else(|| ServerError::Validation("userIdToFollow is required".to_string()))?;

    let (target, _) = app_state
        .graph
        .follow_or_unfollow(user.user_id(), &target)
        .await?;

    Ok(Envelope::ok(UserResponse { user: target }))
}

/// GET /users/getFeedData
pub async fn get_feed_data(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Envelope<FeedData>> {
    let feed = app_state.feed.get_feed(user.user_id()).await?;
    Ok(Envelope::ok(feed))
}

/// GET /users/myPosts
pub async fn my_posts(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Envelope<PostsResponse>> {
    let posts = app_state.feed.my_posts(user.user_id()).await?;
    Ok(Envelope::ok(PostsResponse { posts }))
}

/// GET /users/userPosts
///
/// `userId` may be sent as a JSON body or as a query parameter.
pub async fn user_posts(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    query: Option<Query<UserIdRequest>>,
    body: Option<ApiJson<UserIdRequest>>,
) -> Result<Envelope<PostsResponse>> {
    let user_id = body
        .and_then(|ApiJson(body)| body.user_id)
        .or_else(|| query.and_then(|Query(query)| query.user_id));

    let posts = app_state
        .feed
        .user_posts(user_id.as_ref(), user.user_id())
        .await?;

    Ok(Envelope::ok(PostsResponse { posts }))
}

/// DELETE /users
///
/// Deletes the caller's account, clears the session cookie and returns what
/// the cleanup did.
pub async fn delete_my_profile(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse> {
    let report = app_state.posts.delete_profile(user.user_id()).await?;
    let cookie = app_state.auth_service.removal_cookie().to_string();

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Envelope::ok(DeleteProfileResponse { report }),
    ))
}

/// GET /users/getMyInfo
pub async fn get_my_info(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Envelope<UserResponse>> {
    let me = app_state.accounts.get_my_info(user.user_id()).await?;
    Ok(Envelope::ok(UserResponse { user: me }))
}

/// PUT /users
pub async fn update_profile(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<Envelope<UserResponse>> {
    let updated = app_state
        .accounts
        .update_profile(user.user_id(), req.name, req.bio, req.user_img)
        .await?;

    Ok(Envelope::ok(UserResponse { user: updated }))
}

/// POST /users/getUserProfile
pub async fn get_user_profile(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(req): ApiJson<UserIdRequest>,
) -> Result<Envelope<UserProfile>> {
    let profile = app_state
        .feed
        .get_user_profile(req.user_id.as_ref(), user.user_id())
        .await?;

    Ok(Envelope::ok(profile))
}
