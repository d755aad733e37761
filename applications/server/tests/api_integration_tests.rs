/// API integration tests
/// Tests complete HTTP request/response cycles with real database
mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{TestApp, TEST_IMAGE, TEST_PASSWORD};
use pulse_core::{PostId, SocialStore};
use serde_json::json;

/// Every answer carries its transport status in the envelope
fn assert_envelope(response: &common::TestResponse) {
    assert_eq!(
        response.body["statusCode"].as_u64(),
        Some(u64::from(response.status.as_u16())),
        "envelope status mismatch: {:?}",
        response.body
    );
    assert_eq!(
        response.body["success"].as_bool(),
        Some(response.status.is_success())
    );
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_envelope(&response);
}

#[tokio::test]
async fn test_signup() {
    let app = TestApp::new().await;

    let response = app.signup("alice@example.com", "Alice", TEST_PASSWORD).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.message(), "user successfully created");
    assert_envelope(&response);

    // Same email, different case
    let duplicate = app.signup("ALICE@example.com", "Alice 2", TEST_PASSWORD).await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.message(), "Email already registered");
    assert_envelope(&duplicate);

    assert_eq!(app.store.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_signup_requires_all_fields() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/auth/signup",
            None,
            Some(json!({"email": "a@example.com", "password": "pw"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "All fields are required");

    let blank = app.signup("a@example.com", "   ", "pw").await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_gets_envelope() {
    let app = TestApp::new().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_envelope(&response);
}

#[tokio::test]
async fn test_login_flow() {
    let app = TestApp::new().await;
    app.signup("bob@example.com", "Bob", TEST_PASSWORD).await;

    let unknown = app.login("nobody@example.com", TEST_PASSWORD).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.message(), "User not registered");

    let wrong = app.login("bob@example.com", "wrong-password").await;
    assert_eq!(wrong.status, StatusCode::FORBIDDEN);
    assert_eq!(wrong.message(), "Incorrect Password");
    assert!(wrong.set_cookie().is_none());

    let missing = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": "bob@example.com"})),
        )
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let response = app.login("bob@example.com", TEST_PASSWORD).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_envelope(&response);

    let access_token = response.data()["accessToken"].as_str().unwrap();
    assert!(app.auth.verify_access_token(access_token).is_ok());

    let cookie = response.set_cookie().expect("refresh cookie");
    assert!(cookie.starts_with("jwt="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Secure"));
    assert!(cookie.contains("Path=/"));

    // Use access token to access protected route
    let me = app.get("/users/getMyInfo", access_token).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.data()["user"]["email"], "bob@example.com");
    assert!(me.data()["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_refresh_flow() {
    let app = TestApp::new().await;
    let user = app.register("carol@example.com", "Carol").await;

    let no_cookie = app.request(Method::GET, "/auth/refresh", None, None).await;
    assert_eq!(no_cookie.status, StatusCode::UNAUTHORIZED);
    assert_eq!(no_cookie.message(), "Refresh token in cookie is required");
    assert_envelope(&no_cookie);

    // Forward just the name=value pair of the Set-Cookie header
    let pair = user.refresh_cookie.split(';').next().unwrap().to_string();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/auth/refresh")
        .header(header::COOKIE, pair)
        .body(Body::empty())
        .unwrap();
    let refreshed = app.send(request).await;
    assert_eq!(refreshed.status, StatusCode::CREATED);
    assert_envelope(&refreshed);
    assert!(refreshed.set_cookie().is_none(), "refresh token is not rotated");

    let new_token = refreshed.data()["accessToken"].as_str().unwrap();
    assert_eq!(app.auth.verify_access_token(new_token).unwrap(), user.id);

    // An access token is not a refresh token
    let request = Request::builder()
        .method(Method::GET)
        .uri("/auth/refresh")
        .header(header::COOKIE, format!("jwt={}", user.token))
        .body(Body::empty())
        .unwrap();
    let invalid = app.send(request).await;
    assert_eq!(invalid.status, StatusCode::UNAUTHORIZED);
    assert_eq!(invalid.message(), "Invalid refresh token");
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = TestApp::new().await;

    let response = app.request(Method::POST, "/auth/logout", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.message(), "user logged out");
    let cookie = response.set_cookie().unwrap();
    assert!(cookie.starts_with("jwt=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new().await;

    let missing = app
        .request(Method::GET, "/users/getFeedData", None, None)
        .await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.message(), "Authorization header is required");
    assert_envelope(&missing);

    let invalid = app.get("/users/getFeedData", "not-a-token").await;
    assert_eq!(invalid.status, StatusCode::UNAUTHORIZED);
    assert_eq!(invalid.message(), "Invalid access key");
}

#[tokio::test]
async fn test_follow_toggle() {
    let app = TestApp::new().await;
    let alice = app.register("alice@example.com", "Alice").await;
    let bob = app.register("bob@example.com", "Bob").await;

    let followed = app.follow(&alice, &bob).await;
    assert_eq!(followed.status, StatusCode::OK);
    assert_eq!(followed.data()["user"]["id"], bob.id.as_str());
    assert_eq!(followed.data()["user"]["followers"], json!([alice.id]));

    let a = app.store.get_user(&alice.id).await.unwrap().unwrap();
    let b = app.store.get_user(&bob.id).await.unwrap().unwrap();
    assert!(a.followings.contains(&bob.id));
    assert!(b.followers.contains(&alice.id));

    // Second toggle removes both edges
    let unfollowed = app.follow(&alice, &bob).await;
    assert_eq!(unfollowed.status, StatusCode::OK);

    let a = app.store.get_user(&alice.id).await.unwrap().unwrap();
    let b = app.store.get_user(&bob.id).await.unwrap().unwrap();
    assert!(a.followings.is_empty());
    assert!(b.followers.is_empty());
}

#[tokio::test]
async fn test_follow_rejections() {
    let app = TestApp::new().await;
    let alice = app.register("alice@example.com", "Alice").await;

    let own = app.follow(&alice, &alice).await;
    assert_eq!(own.status, StatusCode::CONFLICT);
    assert_eq!(own.message(), "You can't follow yourself");
    assert_envelope(&own);

    let unknown = app
        .post(
            "/users/follow",
            &alice.token,
            json!({"userIdToFollow": "no-such-user"}),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.message(), "User to follow not found");

    let missing = app.post("/users/follow", &alice.token, json!({})).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let a = app.store.get_user(&alice.id).await.unwrap().unwrap();
    assert!(a.followings.is_empty());
    assert!(a.followers.is_empty());
}

#[tokio::test]
async fn test_like_toggle() {
    let app = TestApp::new().await;
    let owner = app.register("owner@example.com", "Owner").await;
    let fan = app.register("fan@example.com", "Fan").await;
    let post_id = app.create_post(&owner, "sunset").await;

    let liked = app
        .post("/posts/like", &fan.token, json!({"postId": post_id}))
        .await;
    assert_eq!(liked.status, StatusCode::OK);
    let post = &liked.data()["post"];
    assert_eq!(post["likesCount"], 1);
    assert_eq!(post["isLiked"], true);
    assert_eq!(post["owner"]["name"], "Owner");
    assert!(post.get("likes").is_none());

    let unliked = app
        .post("/posts/like", &fan.token, json!({"postId": post_id}))
        .await;
    assert_eq!(unliked.data()["post"]["likesCount"], 0);
    assert_eq!(unliked.data()["post"]["isLiked"], false);

    let stored = app
        .store
        .get_post(&PostId::new(post_id))
        .await
        .unwrap()
        .unwrap();
    assert!(stored.likes.is_empty());

    let unknown = app
        .post("/posts/like", &fan.token, json!({"postId": "missing"}))
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.message(), "Post not found");
}

#[tokio::test]
async fn test_create_post() {
    let app = TestApp::new().await;
    let owner = app.register("owner@example.com", "Owner").await;

    let missing = app
        .post("/posts", &owner.token, json!({"caption": "no image"}))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.message(), "Caption and postImg are required");

    let response = app
        .post(
            "/posts",
            &owner.token,
            json!({"caption": "first", "postImg": TEST_IMAGE}),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_envelope(&response);

    let post = &response.data()["post"];
    assert_eq!(post["caption"], "first");
    assert_eq!(post["likesCount"], 0);
    assert!(post["image"]["publicId"]
        .as_str()
        .unwrap()
        .starts_with("postImg/"));

    let user = app.store.get_user(&owner.id).await.unwrap().unwrap();
    assert_eq!(user.posts.len(), 1);
    assert_eq!(user.posts.as_slice()[0].as_str(), post["id"].as_str().unwrap());
}

#[tokio::test]
async fn test_feed_order_followings_and_suggestions() {
    let app = TestApp::new().await;
    let alice = app.register("alice@example.com", "Alice").await;
    let bob = app.register("bob@example.com", "Bob").await;
    let carol = app.register("carol@example.com", "Carol").await;
    let dave = app.register("dave@example.com", "Dave").await;

    app.follow(&alice, &bob).await;
    app.follow(&alice, &carol).await;

    let p1 = app.create_post(&bob, "p1").await;
    let p2 = app.create_post(&carol, "p2").await;
    app.create_post(&dave, "not followed").await;

    let feed = app.get("/users/getFeedData", &alice.token).await;
    assert_eq!(feed.status, StatusCode::OK);
    assert_envelope(&feed);

    let post_ids: Vec<&str> = feed.data()["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(post_ids, vec![p2.as_str(), p1.as_str()]);

    let followings: Vec<&str> = feed.data()["followings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    assert_eq!(followings, vec!["Bob", "Carol"]);

    let suggestions: Vec<&str> = feed.data()["suggestions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_str().unwrap())
        .collect();
    assert_eq!(suggestions, vec![dave.id.as_str()]);
}

#[tokio::test]
async fn test_only_owner_may_update_or_delete() {
    let app = TestApp::new().await;
    let owner = app.register("owner@example.com", "Owner").await;
    let other = app.register("other@example.com", "Other").await;
    let post_id = app.create_post(&owner, "original").await;

    let update = app
        .request(
            Method::PUT,
            "/posts",
            Some(&other.token),
            Some(json!({"postId": post_id, "caption": "hijacked"})),
        )
        .await;
    assert_eq!(update.status, StatusCode::FORBIDDEN);
    assert_eq!(update.message(), "Only the owners can update their post");

    let delete = app
        .request(
            Method::DELETE,
            "/posts",
            Some(&other.token),
            Some(json!({"postId": post_id})),
        )
        .await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);
    assert_eq!(delete.message(), "Only the owners can delete their post");

    let stored = app
        .store
        .get_post(&PostId::new(post_id.clone()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.caption, "original");
}

#[tokio::test]
async fn test_owner_updates_and_deletes_post() {
    let app = TestApp::new().await;
    let owner = app.register("owner@example.com", "Owner").await;
    let post_id = app.create_post(&owner, "original").await;

    let updated = app
        .request(
            Method::PUT,
            "/posts",
            Some(&owner.token),
            Some(json!({"postId": post_id, "caption": "edited"})),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.data()["post"]["caption"], "edited");

    // Blank caption leaves the post unchanged
    let blank = app
        .request(
            Method::PUT,
            "/posts",
            Some(&owner.token),
            Some(json!({"postId": post_id, "caption": ""})),
        )
        .await;
    assert_eq!(blank.status, StatusCode::OK);
    assert_eq!(blank.data()["post"]["caption"], "edited");

    let deleted = app
        .request(
            Method::DELETE,
            "/posts",
            Some(&owner.token),
            Some(json!({"postId": post_id})),
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_envelope(&deleted);

    assert!(app
        .store
        .get_post(&PostId::new(post_id))
        .await
        .unwrap()
        .is_none());
    let user = app.store.get_user(&owner.id).await.unwrap().unwrap();
    assert!(user.posts.is_empty());
    assert_eq!(app.media.destroyed().len(), 1);

    let missing = app
        .request(
            Method::DELETE,
            "/posts",
            Some(&owner.token),
            Some(json!({"postId": "gone"})),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profiles_and_post_listings() {
    let app = TestApp::new().await;
    let alice = app.register("alice@example.com", "Alice").await;
    let bob = app.register("bob@example.com", "Bob").await;

    let first = app.create_post(&bob, "first").await;
    let second = app.create_post(&bob, "second").await;
    app.post("/posts/like", &alice.token, json!({"postId": first}))
        .await;

    let profile = app
        .post("/users/getUserProfile", &alice.token, json!({"userId": bob.id}))
        .await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.data()["user"]["name"], "Bob");
    let posts = profile.data()["posts"].as_array().unwrap();
    assert_eq!(posts[0]["id"], second.as_str());
    assert_eq!(posts[1]["id"], first.as_str());
    assert_eq!(posts[1]["isLiked"], true);

    let missing = app
        .post("/users/getUserProfile", &alice.token, json!({}))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let mine = app.get("/users/myPosts", &bob.token).await;
    assert_eq!(mine.data()["posts"].as_array().unwrap().len(), 2);

    let by_query = app
        .get(&format!("/users/userPosts?userId={}", bob.id), &alice.token)
        .await;
    assert_eq!(by_query.status, StatusCode::OK);
    assert_eq!(by_query.data()["posts"][0]["id"], second.as_str());

    let by_body = app
        .request(
            Method::GET,
            "/users/userPosts",
            Some(&alice.token),
            Some(json!({"userId": bob.id})),
        )
        .await;
    assert_eq!(by_body.data()["posts"].as_array().unwrap().len(), 2);

    let no_user = app.get("/users/userPosts", &alice.token).await;
    assert_eq!(no_user.status, StatusCode::BAD_REQUEST);
    assert_eq!(no_user.message(), "userId is required");
}

#[tokio::test]
async fn test_update_profile() {
    let app = TestApp::new().await;
    let alice = app.register("alice@example.com", "Alice").await;

    let response = app
        .request(
            Method::PUT,
            "/users",
            Some(&alice.token),
            Some(json!({"name": "  ", "bio": "Hello", "userImg": TEST_IMAGE})),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let user = &response.data()["user"];
    assert_eq!(user["name"], "Alice");
    assert_eq!(user["bio"], "Hello");
    assert!(user["avatar"]["publicId"]
        .as_str()
        .unwrap()
        .starts_with("profileImg/"));

    // Replacing the avatar removes the old one
    let old_avatar = user["avatar"]["publicId"].as_str().unwrap().to_string();
    app.request(
        Method::PUT,
        "/users",
        Some(&alice.token),
        Some(json!({"userImg": TEST_IMAGE})),
    )
    .await;
    assert_eq!(app.media.destroyed(), vec![old_avatar]);
}

#[tokio::test]
async fn test_unknown_route_gets_envelope() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/nowhere", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_envelope(&response);
}
