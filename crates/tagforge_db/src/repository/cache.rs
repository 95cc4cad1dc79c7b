use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::{CacheEntry, NewCacheEntry};

pub struct CacheQuery;

impl CacheQuery {
    pub const UPSERT: &'static str = r#"
        INSERT OR REPLACE INTO cache_entries
        (namespace, url, kind, status, headers_json, body, checksum, cached_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    "#;

    pub const FIND: &'static str = r#"
        SELECT namespace, url, kind, status, headers_json, body, checksum, cached_at
        FROM cache_entries
        WHERE namespace = $1 AND url = $2
    "#;

    pub const NAMESPACES: &'static str = r#"
        SELECT DISTINCT namespace FROM cache_entries ORDER BY namespace ASC
    "#;
}

/// Named cache namespaces, each an independent `url -> response` map.
#[derive(Clone)]
pub struct CacheRepository {
    pool: SqlitePool,
}

impl CacheRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Stores the response, replacing any earlier copy of the same URL in
    /// that namespace.
    pub async fn put(&self, entry: &NewCacheEntry) -> Result<()> {
        let headers_json = serde_json::to_string(&entry.headers).unwrap_or_else(|_| "[]".to_string());

        sqlx::query(CacheQuery::UPSERT)
            .bind(&entry.namespace)
            .bind(&entry.url)
            .bind(entry.kind.as_str())
            .bind(i64::from(entry.status))
            .bind(headers_json)
            .bind(&entry.body)
            .bind(entry.checksum())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        tracing::debug!("cached {} in {}", entry.url, entry.namespace);
        Ok(())
    }

    pub async fn get(&self, namespace: &str, url: &str) -> Result<Option<CacheEntry>> {
        let entry = sqlx::query_as::<_, CacheEntry>(CacheQuery::FIND)
            .bind(namespace)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    /// First hit for `url`, searching `namespaces` in the given order.
    pub async fn find_first(&self, namespaces: &[String], url: &str) -> Result<Option<CacheEntry>> {
        for namespace in namespaces {
            if let Some(entry) = self.get(namespace, url).await? {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    pub async fn list_namespaces(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(CacheQuery::NAMESPACES)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(ns,)| ns).collect())
    }

    /// Removes the whole namespace. Returns the number of entries dropped.
    pub async fn delete_namespace(&self, namespace: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cache_entries WHERE namespace = $1")
            .bind(namespace)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(&self, namespace: &str) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cache_entries WHERE namespace = $1")
            .bind(namespace)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
