//! Common test utilities and fixtures
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use pulse_core::{
    Credentials, MediaRef, NewUser, Post, PostId, PulseError, Result as CoreResult, SocialStore,
    User, UserId,
};
use pulse_server::{
    create_router,
    services::{AuthService, MediaHost, SocialGraph, TokenSettings},
    AppState, Result as ServerResult,
};
use pulse_storage::SqliteStore;
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "TestPassword123!";

/// A tiny PNG-ish payload as a data URL
pub const TEST_IMAGE: &str = "data:image/png;base64,aGVsbG8=";

pub fn token_settings() -> TokenSettings {
    TokenSettings {
        access_secret: "test-access-secret".to_string(),
        refresh_secret: "test-refresh-secret".to_string(),
        access_ttl: Duration::hours(24),
        refresh_ttl: Duration::days(365),
    }
}

/// Create a store backed by a real SQLite file in a temp directory
pub async fn create_test_store() -> (Arc<SqliteStore>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_url = format!("sqlite://{}", temp_dir.path().join("test.db").display());
    let store = SqliteStore::open(&db_url).await.unwrap();
    (Arc::new(store), temp_dir)
}

/// Media host that records uploads and removals in memory
#[derive(Default)]
pub struct MemoryMediaHost {
    counter: AtomicUsize,
    pub uploaded: Mutex<Vec<String>>,
    pub destroyed: Mutex<Vec<String>>,
}

impl MemoryMediaHost {
    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaHost for MemoryMediaHost {
    async fn upload(&self, _payload: &str, folder: &str) -> ServerResult<MediaRef> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let public_id = format!("{folder}/{n}");
        self.uploaded.lock().unwrap().push(public_id.clone());
        Ok(MediaRef::new(
            public_id.clone(),
            format!("https://media.test/{public_id}"),
        ))
    }

    async fn destroy(&self, public_id: &str) -> ServerResult<()> {
        self.destroyed.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}

/// SQLite store with scripted interference.
///
/// Single-id edge removals can be made to fail for chosen users, and a follow
/// can be committed right before the next post or profile write, after the
/// service has already loaded the records it works on.
pub struct ScriptedStore {
    inner: Arc<SqliteStore>,
    fail_detach_for: Mutex<Vec<UserId>>,
    follow_before_write: Mutex<Option<(UserId, UserId)>>,
}

impl ScriptedStore {
    pub fn new(inner: Arc<SqliteStore>) -> Self {
        Self {
            inner,
            fail_detach_for: Mutex::new(Vec::new()),
            follow_before_write: Mutex::new(None),
        }
    }

    pub fn fail_detach_for(&self, id: &UserId) {
        self.fail_detach_for.lock().unwrap().push(id.clone());
    }

    /// Make `follower` follow `followee` just before the next write
    pub fn follow_before_next_write(&self, follower: &UserId, followee: &UserId) {
        *self.follow_before_write.lock().unwrap() = Some((follower.clone(), followee.clone()));
    }

    async fn run_pending_follow(&self) {
        let pending = self.follow_before_write.lock().unwrap().take();
        if let Some((follower, followee)) = pending {
            SocialGraph::new(Arc::clone(&self.inner) as Arc<dyn SocialStore>)
                .follow_or_unfollow(&follower, &followee)
                .await
                .expect("Interleaved follow failed");
        }
    }

    fn check_detach(&self, user: &UserId) -> CoreResult<()> {
        if self.fail_detach_for.lock().unwrap().contains(user) {
            return Err(PulseError::storage("simulated write failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl SocialStore for ScriptedStore {
    async fn create_user(&self, user: NewUser) -> CoreResult<User> {
        self.inner.create_user(user).await
    }

    async fn get_user(&self, id: &UserId) -> CoreResult<Option<User>> {
        self.inner.get_user(id).await
    }

    async fn get_users(&self, ids: &[UserId]) -> CoreResult<Vec<User>> {
        self.inner.get_users(ids).await
    }

    async fn find_credentials(&self, email: &str) -> CoreResult<Option<Credentials>> {
        self.inner.find_credentials(email).await
    }

    async fn list_users(&self) -> CoreResult<Vec<User>> {
        self.inner.list_users().await
    }

    async fn list_users_excluding(&self, excluded: &[UserId]) -> CoreResult<Vec<User>> {
        self.inner.list_users_excluding(excluded).await
    }

    async fn save_profile(&self, user: &User) -> CoreResult<()> {
        self.run_pending_follow().await;
        self.inner.save_profile(user).await
    }

    async fn save_follow_edges(&self, first: &User, second: &User) -> CoreResult<()> {
        self.inner.save_follow_edges(first, second).await
    }

    async fn remove_following(&self, user: &UserId, followee: &UserId) -> CoreResult<bool> {
        self.check_detach(user)?;
        self.inner.remove_following(user, followee).await
    }

    async fn remove_follower(&self, user: &UserId, follower: &UserId) -> CoreResult<bool> {
        self.check_detach(user)?;
        self.inner.remove_follower(user, follower).await
    }

    async fn delete_user(&self, id: &UserId) -> CoreResult<()> {
        self.inner.delete_user(id).await
    }

    async fn create_post(&self, post: &Post) -> CoreResult<()> {
        self.run_pending_follow().await;
        self.inner.create_post(post).await
    }

    async fn get_post(&self, id: &PostId) -> CoreResult<Option<Post>> {
        self.inner.get_post(id).await
    }

    async fn update_caption(&self, id: &PostId, caption: &str) -> CoreResult<()> {
        self.run_pending_follow().await;
        self.inner.update_caption(id, caption).await
    }

    async fn save_likes(&self, post: &Post) -> CoreResult<()> {
        self.inner.save_likes(post).await
    }

    async fn remove_like(&self, id: &PostId, user: &UserId) -> CoreResult<bool> {
        self.inner.remove_like(id, user).await
    }

    async fn delete_post(&self, id: &PostId, owner: &UserId) -> CoreResult<()> {
        self.run_pending_follow().await;
        self.inner.delete_post(id, owner).await
    }

    async fn delete_posts_by_owner(&self, owner: &UserId) -> CoreResult<u64> {
        self.inner.delete_posts_by_owner(owner).await
    }

    async fn posts_by_owners(&self, owners: &[UserId]) -> CoreResult<Vec<Post>> {
        self.inner.posts_by_owners(owners).await
    }

    async fn posts_liked_by(&self, user: &UserId) -> CoreResult<Vec<Post>> {
        self.inner.posts_liked_by(user).await
    }
}

/// Response pieces tests look at
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }

    pub fn set_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string())
    }
}

/// A registered, logged-in user
pub struct TestUser {
    pub id: UserId,
    pub email: String,
    pub token: String,
    pub refresh_cookie: String,
}

/// Router plus handles on everything behind it
pub struct TestApp {
    pub router: Router,
    pub store: Arc<SqliteStore>,
    pub auth: Arc<AuthService>,
    pub media: Arc<MemoryMediaHost>,
    _temp_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_store(|store| store as Arc<dyn SocialStore>).await
    }

    /// Build the app on a [`ScriptedStore`] and return a handle on it
    pub async fn scripted() -> (Self, Arc<ScriptedStore>) {
        let mut handle = None;
        let app = Self::with_store(|inner| {
            let scripted = Arc::new(ScriptedStore::new(inner));
            handle = Some(Arc::clone(&scripted));
            scripted as Arc<dyn SocialStore>
        })
        .await;
        (app, handle.expect("Store wrapper was not built"))
    }

    /// Build the app with the SQLite store wrapped by `wrap`
    pub async fn with_store<F>(wrap: F) -> Self
    where
        F: FnOnce(Arc<SqliteStore>) -> Arc<dyn SocialStore>,
    {
        let (store, temp_dir) = create_test_store().await;
        let auth = Arc::new(AuthService::new(token_settings()));
        let media = Arc::new(MemoryMediaHost::default());

        let state = AppState::new(
            wrap(Arc::clone(&store)),
            Arc::clone(&auth),
            Arc::clone(&media) as Arc<dyn MediaHost>,
        );
        let router = create_router(state, None);

        Self {
            router,
            store,
            auth,
            media,
            _temp_dir: temp_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn signup(&self, email: &str, name: &str, password: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/auth/signup",
            None,
            Some(json!({"email": email, "name": name, "password": password})),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": email, "password": password})),
        )
        .await
    }

    /// Sign up and log in a user
    pub async fn register(&self, email: &str, name: &str) -> TestUser {
        let signup = self.signup(email, name, TEST_PASSWORD).await;
        assert_eq!(signup.status, StatusCode::CREATED, "signup failed: {:?}", signup.body);

        let login = self.login(email, TEST_PASSWORD).await;
        assert_eq!(login.status, StatusCode::OK, "login failed: {:?}", login.body);

        let token = login.data()["accessToken"].as_str().unwrap().to_string();
        let refresh_cookie = login.set_cookie().unwrap();
        let id = self
            .store
            .find_credentials(email)
            .await
            .unwrap()
            .unwrap()
            .user_id;

        TestUser {
            id,
            email: email.to_string(),
            token,
            refresh_cookie,
        }
    }

    /// Create a post through the API and return its id
    pub async fn create_post(&self, user: &TestUser, caption: &str) -> String {
        let response = self
            .post(
                "/posts",
                &user.token,
                json!({"caption": caption, "postImg": TEST_IMAGE}),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.data()["post"]["id"].as_str().unwrap().to_string()
    }

    pub async fn follow(&self, actor: &TestUser, target: &TestUser) -> TestResponse {
        self.post(
            "/users/follow",
            &actor.token,
            json!({"userIdToFollow": target.id}),
        )
        .await
    }
}
