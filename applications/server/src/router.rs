/// HTTP router
use crate::{api, api::Envelope, middleware, state::AppState};
use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::{path::PathBuf, sync::Arc};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the application router.
///
/// `media_dir` is served under `/media` when the local media host is in use.
pub fn create_router(app_state: AppState, media_dir: Option<PathBuf>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(api::health::health))
        .route("/auth/signup", post(api::auth::signup))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/refresh", get(api::auth::refresh))
        .route("/auth/logout", post(api::auth::logout));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        // Posts
        .route(
            "/posts",
            post(api::posts::create_post)
                .put(api::posts::update_post)
                .delete(api::posts::delete_post),
        )
        .route("/posts/like", post(api::posts::like_post))
        // Users
        .route(
            "/users",
            axum::routing::delete(api::users::delete_my_profile).put(api::users::update_profile),
        )
        .route("/users/follow", post(api::users::follow))
        .route("/users/getFeedData", get(api::users::get_feed_data))
        .route("/users/myPosts", get(api::users::my_posts))
        .route("/users/userPosts", get(api::users::user_posts))
        .route("/users/getMyInfo", get(api::users::get_my_info))
        .route("/users/getUserProfile", post(api::users::get_user_profile))
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&app_state.auth_service),
            middleware::auth_middleware,
        ));

    let mut router = public_routes.merge(protected_routes);

    if let Some(media_dir) = media_dir {
        router = router.nest_service("/media", ServeDir::new(media_dir));
    }

    router
        .fallback(|| async { Envelope::error(StatusCode::NOT_FOUND, "Route not found") })
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
