//! Pulse Storage
//!
//! `SQLite` database layer for Pulse.
//!
//! Users and posts are stored as document-shaped rows: identity sets (owned
//! posts, followers, followings, likes) live as JSON arrays on the row that
//! owns them.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: `users` and `posts` each own their queries
//! - **Atomic pairs**: operations that touch two rows run in one transaction
//! - **Trait-backed**: [`SqliteStore`] implements `pulse_core::SocialStore`
//!
//! # Example
//!
//! ```rust,no_run
//! use pulse_storage::{create_pool, run_migrations, SqliteStore};
//! use pulse_core::SocialStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://pulse.db").await?;
//! run_migrations(&pool).await?;
//!
//! let store = SqliteStore::new(pool);
//! let users = store.list_users().await?;
//! # Ok(())
//! # }
//! ```

mod columns;
mod context;
mod error;

// Vertical slices
pub mod posts;
pub mod users;

pub use context::SqliteStore;
pub use error::StorageError;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://pulse.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(database_url, "Creating SQLite pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::debug!("SQLite pool ready");

    Ok(pool)
}
