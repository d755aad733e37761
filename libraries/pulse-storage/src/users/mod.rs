//! User records and credential queries

use crate::columns::{contains_value, decode_set, encode_set, timestamp, without_value};
use crate::error::{Result, StorageError};
use pulse_core::types::{Credentials, MediaRef, NewUser, User, UserId};
use sqlx::{sqlite::SqliteRow, Executor, QueryBuilder, Row, Sqlite, SqlitePool};
use std::collections::HashMap;

const USER_COLUMNS: &str =
    "id, email, name, bio, avatar_public_id, avatar_url, posts, followers, followings, created_at";

fn from_row(row: &SqliteRow) -> Result<User> {
    let avatar = match (
        row.get::<Option<String>, _>("avatar_public_id"),
        row.get::<Option<String>, _>("avatar_url"),
    ) {
        (Some(public_id), Some(url)) => Some(MediaRef { public_id, url }),
        _ => None,
    };

    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        bio: row.get("bio"),
        avatar,
        posts: decode_set(row.get::<&str, _>("posts"))?,
        followers: decode_set(row.get::<&str, _>("followers"))?,
        followings: decode_set(row.get::<&str, _>("followings"))?,
        created_at: timestamp(row.get("created_at"))?,
    })
}

/// Register a new user
///
/// # Errors
///
/// Returns `StorageError::Duplicate` if the email is already registered
pub async fn create(pool: &SqlitePool, new_user: NewUser) -> Result<User> {
    let user = User::new(new_user.email, new_user.name);

    let result = sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash, name, posts, followers, followings, created_at)
        VALUES (?, ?, ?, ?, '[]', '[]', '[]', ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&new_user.password_hash)
    .bind(&user.name)
    .bind(user.created_at.timestamp_millis())
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(user),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(StorageError::Duplicate(
            format!("email already registered: {}", user.email),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Get user by ID
pub async fn get_by_id(pool: &SqlitePool, id: &UserId) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;

    row.as_ref().map(from_row).transpose()
}

/// Get several users, preserving the order of `ids` and skipping unknown ones
pub async fn get_many(pool: &SqlitePool, ids: &[UserId]) -> Result<Vec<User>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users WHERE id IN ("));
    {
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id.as_str().to_owned());
        }
        separated.push_unseparated(")");
    }

    let rows = builder.build().fetch_all(pool).await?;
    let mut by_id: HashMap<UserId, User> = rows
        .iter()
        .map(|row| from_row(row).map(|user| (user.id.clone(), user)))
        .collect::<Result<_>>()?;

    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}

/// Look up the password hash registered for `email`
pub async fn find_credentials(pool: &SqlitePool, email: &str) -> Result<Option<Credentials>> {
    let row = sqlx::query("SELECT id, password_hash FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| Credentials {
        user_id: row.get("id"),
        password_hash: row.get("password_hash"),
    }))
}

/// Get all users, oldest first
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<User>> {
    get_all_excluding(pool, &[]).await
}

/// Get all users whose id is not in `excluded`, oldest first
pub async fn get_all_excluding(pool: &SqlitePool, excluded: &[UserId]) -> Result<Vec<User>> {
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users"));

    if !excluded.is_empty() {
        builder.push(" WHERE id NOT IN (");
        let mut separated = builder.separated(", ");
        for id in excluded {
            separated.push_bind(id.as_str().to_owned());
        }
        separated.push_unseparated(")");
    }
    builder.push(" ORDER BY created_at, rowid");

    let rows = builder.build().fetch_all(pool).await?;
    rows.iter().map(from_row).collect()
}

/// JSON id lists stored on a user row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdList {
    Posts,
    Followers,
    Followings,
}

impl IdList {
    fn column(self) -> &'static str {
        match self {
            IdList::Posts => "posts",
            IdList::Followers => "followers",
            IdList::Followings => "followings",
        }
    }
}

fn ensure_updated(rows_affected: u64, id: &UserId) -> Result<()> {
    if rows_affected == 0 {
        return Err(StorageError::not_found("User", id.as_str()));
    }
    Ok(())
}

/// Overwrite name, bio and avatar. Id lists are left alone.
pub async fn save_profile<'e, E>(executor: E, user: &User) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let (avatar_public_id, avatar_url) = match &user.avatar {
        Some(avatar) => (Some(avatar.public_id.as_str()), Some(avatar.url.as_str())),
        None => (None, None),
    };

    let result = sqlx::query(
        r#"
        UPDATE users
        SET name = ?, bio = ?, avatar_public_id = ?, avatar_url = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.name)
    .bind(&user.bio)
    .bind(avatar_public_id)
    .bind(avatar_url)
    .bind(&user.id)
    .execute(executor)
    .await?;

    ensure_updated(result.rows_affected(), &user.id)
}

/// Overwrite the follower and following sets
pub async fn save_edges<'e, E>(executor: E, user: &User) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("UPDATE users SET followers = ?, followings = ? WHERE id = ?")
        .bind(encode_set(&user.followers)?)
        .bind(encode_set(&user.followings)?)
        .bind(&user.id)
        .execute(executor)
        .await?;

    ensure_updated(result.rows_affected(), &user.id)
}

/// Append `value` to one of `user`'s id lists
pub async fn push_id<'e, E>(executor: E, user: &UserId, list: IdList, value: &str) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let column = list.column();
    let sql = format!("UPDATE users SET {column} = json_insert({column}, '$[#]', ?) WHERE id = ?");
    let result = sqlx::query(&sql)
        .bind(value)
        .bind(user)
        .execute(executor)
        .await?;

    ensure_updated(result.rows_affected(), user)
}

/// Drop `value` from one of `user`'s id lists
///
/// Returns `false` when the user does not exist or the list did not hold it.
pub async fn remove_id<'e, E>(
    executor: E,
    user: &UserId,
    list: IdList,
    value: &str,
) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let column = list.column();
    let qualified = format!("users.{column}");
    let sql = format!(
        "UPDATE users SET {column} = {} WHERE id = ? AND {}",
        without_value(&qualified),
        contains_value(&qualified)
    );
    let result = sqlx::query(&sql)
        .bind(value)
        .bind(user)
        .bind(value)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a user record
pub async fn delete(pool: &SqlitePool, id: &UserId) -> Result<()> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("User", id.as_str()));
    }

    Ok(())
}
