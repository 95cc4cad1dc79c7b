pub mod error;
pub mod models;
pub mod repository;
pub mod schema;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub use error::{Error, Result};
pub use models::{CacheEntry, NewCacheEntry, PendingDownload, ResponseKind};
pub use repository::{CacheRepository, PendingRepository, SettingsRepository};

/// Opens (creating if needed) the local store. In-memory databases are
/// pinned to a single connection that never expires, otherwise every
/// pooled connection would see its own empty database.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new().max_connections(5).connect_with(options).await?
    };

    Ok(pool)
}

/// `connect` followed by `rebuild_database`.
pub async fn open(database_url: &str) -> Result<SqlitePool> {
    let pool = connect(database_url).await?;
    schema::rebuild_database(&pool).await?;
    Ok(pool)
}
