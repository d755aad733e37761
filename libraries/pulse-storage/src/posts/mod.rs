//! Post records and like sets

use crate::columns::{contains_value, decode_set, encode_set, timestamp, without_value};
use crate::error::{Result, StorageError};
use pulse_core::types::{MediaRef, Post, PostId, UserId};
use sqlx::{sqlite::SqliteRow, Executor, QueryBuilder, Row, Sqlite, SqlitePool};

const POST_COLUMNS: &str = "id, owner_id, caption, image_public_id, image_url, likes, created_at";

fn from_row(row: &SqliteRow) -> Result<Post> {
    Ok(Post {
        id: row.get("id"),
        owner: row.get("owner_id"),
        caption: row.get("caption"),
        image: MediaRef {
            public_id: row.get("image_public_id"),
            url: row.get("image_url"),
        },
        likes: decode_set(row.get::<&str, _>("likes"))?,
        created_at: timestamp(row.get("created_at"))?,
    })
}

/// Insert a new post
pub async fn insert<'e, E>(executor: E, post: &Post) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO posts (id, owner_id, caption, image_public_id, image_url, likes, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&post.id)
    .bind(&post.owner)
    .bind(&post.caption)
    .bind(&post.image.public_id)
    .bind(&post.image.url)
    .bind(encode_set(&post.likes)?)
    .bind(post.created_at.timestamp_millis())
    .execute(executor)
    .await?;

    Ok(())
}

/// Get post by ID
pub async fn get_by_id(pool: &SqlitePool, id: &PostId) -> Result<Option<Post>> {
    let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?");
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;

    row.as_ref().map(from_row).transpose()
}

fn ensure_updated(rows_affected: u64, id: &PostId) -> Result<()> {
    if rows_affected == 0 {
        return Err(StorageError::not_found("Post", id.as_str()));
    }
    Ok(())
}

/// Overwrite the caption
pub async fn update_caption(pool: &SqlitePool, id: &PostId, caption: &str) -> Result<()> {
    let result = sqlx::query("UPDATE posts SET caption = ? WHERE id = ?")
        .bind(caption)
        .bind(id)
        .execute(pool)
        .await?;

    ensure_updated(result.rows_affected(), id)
}

/// Overwrite the like set
pub async fn save_likes(pool: &SqlitePool, post: &Post) -> Result<()> {
    let result = sqlx::query("UPDATE posts SET likes = ? WHERE id = ?")
        .bind(encode_set(&post.likes)?)
        .bind(&post.id)
        .execute(pool)
        .await?;

    ensure_updated(result.rows_affected(), &post.id)
}

/// Drop `user` from the like set. Returns `false` if it was not there.
pub async fn remove_like(pool: &SqlitePool, id: &PostId, user: &UserId) -> Result<bool> {
    let sql = format!(
        "UPDATE posts SET likes = {} WHERE id = ? AND {}",
        without_value("posts.likes"),
        contains_value("posts.likes")
    );
    let result = sqlx::query(&sql)
        .bind(user)
        .bind(id)
        .bind(user)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a post
pub async fn delete<'e, E>(executor: E, id: &PostId) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("Post", id.as_str()));
    }

    Ok(())
}

/// Delete every post owned by `owner`
pub async fn delete_by_owner(pool: &SqlitePool, owner: &UserId) -> Result<u64> {
    let result = sqlx::query("DELETE FROM posts WHERE owner_id = ?")
        .bind(owner)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Posts owned by any of `owners`, in creation order
pub async fn get_by_owners(pool: &SqlitePool, owners: &[UserId]) -> Result<Vec<Post>> {
    if owners.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM posts WHERE owner_id IN ("));
    {
        let mut separated = builder.separated(", ");
        for owner in owners {
            separated.push_bind(owner.as_str().to_owned());
        }
        separated.push_unseparated(")");
    }
    builder.push(" ORDER BY created_at, rowid");

    let rows = builder.build().fetch_all(pool).await?;
    rows.iter().map(from_row).collect()
}

/// Posts whose like set contains `user`, in creation order
pub async fn get_liked_by(pool: &SqlitePool, user: &UserId) -> Result<Vec<Post>> {
    let sql = format!(
        r#"
        SELECT {POST_COLUMNS} FROM posts
        WHERE EXISTS (SELECT 1 FROM json_each(posts.likes) WHERE json_each.value = ?)
        ORDER BY created_at, rowid
        "#
    );
    let rows = sqlx::query(&sql).bind(user).fetch_all(pool).await?;

    rows.iter().map(from_row).collect()
}
