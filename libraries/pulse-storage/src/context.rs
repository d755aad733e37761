use crate::users::IdList;
use crate::{posts, users, StorageError};
use async_trait::async_trait;
use pulse_core::{error::Result, storage::SocialStore, types::*};
use sqlx::SqlitePool;

/// Social store backed by `SQLite`
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` and bring the schema up to date
    pub async fn open(database_url: &str) -> std::result::Result<Self, StorageError> {
        let pool = crate::create_pool(database_url).await?;
        crate::run_migrations(&pool)
            .await
            .map_err(|e| StorageError::Database(e.into()))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl SocialStore for SqliteStore {
    // Users
    async fn create_user(&self, user: NewUser) -> Result<User> {
        Ok(users::create(&self.pool, user).await?)
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        Ok(users::get_by_id(&self.pool, id).await?)
    }

    async fn get_users(&self, ids: &[UserId]) -> Result<Vec<User>> {
        Ok(users::get_many(&self.pool, ids).await?)
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>> {
        Ok(users::find_credentials(&self.pool, email).await?)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(users::get_all(&self.pool).await?)
    }

    async fn list_users_excluding(&self, excluded: &[UserId]) -> Result<Vec<User>> {
        Ok(users::get_all_excluding(&self.pool, excluded).await?)
    }

    async fn save_profile(&self, user: &User) -> Result<()> {
        Ok(users::save_profile(&self.pool, user).await?)
    }

    async fn save_follow_edges(&self, first: &User, second: &User) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        users::save_edges(&mut *tx, first).await?;
        users::save_edges(&mut *tx, second).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn remove_following(&self, user: &UserId, followee: &UserId) -> Result<bool> {
        Ok(users::remove_id(&self.pool, user, IdList::Followings, followee.as_str()).await?)
    }

    async fn remove_follower(&self, user: &UserId, follower: &UserId) -> Result<bool> {
        Ok(users::remove_id(&self.pool, user, IdList::Followers, follower.as_str()).await?)
    }

    async fn delete_user(&self, id: &UserId) -> Result<()> {
        Ok(users::delete(&self.pool, id).await?)
    }

    // Posts
    async fn create_post(&self, post: &Post) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        posts::insert(&mut *tx, post).await?;
        users::push_id(&mut *tx, &post.owner, IdList::Posts, post.id.as_str()).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get_post(&self, id: &PostId) -> Result<Option<Post>> {
        Ok(posts::get_by_id(&self.pool, id).await?)
    }

    async fn update_caption(&self, id: &PostId, caption: &str) -> Result<()> {
        Ok(posts::update_caption(&self.pool, id, caption).await?)
    }

    async fn save_likes(&self, post: &Post) -> Result<()> {
        Ok(posts::save_likes(&self.pool, post).await?)
    }

    async fn remove_like(&self, id: &PostId, user: &UserId) -> Result<bool> {
        Ok(posts::remove_like(&self.pool, id, user).await?)
    }

    async fn delete_post(&self, id: &PostId, owner: &UserId) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        posts::delete(&mut *tx, id).await?;
        users::remove_id(&mut *tx, owner, IdList::Posts, id.as_str()).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_posts_by_owner(&self, owner: &UserId) -> Result<u64> {
        Ok(posts::delete_by_owner(&self.pool, owner).await?)
    }

    async fn posts_by_owners(&self, owners: &[UserId]) -> Result<Vec<Post>> {
        Ok(posts::get_by_owners(&self.pool, owners).await?)
    }

    async fn posts_liked_by(&self, user: &UserId) -> Result<Vec<Post>> {
        Ok(posts::get_liked_by(&self.pool, user).await?)
    }
}
