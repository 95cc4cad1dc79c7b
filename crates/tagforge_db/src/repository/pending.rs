use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::PendingDownload;

/// Persisted queue of document URLs that could not be fetched.
#[derive(Clone)]
pub struct PendingRepository {
    pool: SqlitePool,
}

impl PendingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Adds `url` unless it is already queued. Returns true when a new row
    /// was written.
    pub async fn enqueue(&self, url: &str, tenant: Option<&str>) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO pending_downloads (url, tenant, queued_at) VALUES ($1, $2, $3)",
        )
        .bind(url)
        .bind(tenant)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Returns true when the URL was queued.
    pub async fn remove(&self, url: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pending_downloads WHERE url = $1")
            .bind(url)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Queue contents, oldest first.
    pub async fn list(&self) -> Result<Vec<PendingDownload>> {
        let rows = sqlx::query_as::<_, PendingDownload>(
            "SELECT url, tenant, queued_at FROM pending_downloads ORDER BY queued_at ASC, rowid ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn contains(&self, url: &str) -> Result<bool> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pending_downloads WHERE url = $1")
            .bind(url)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }
}
