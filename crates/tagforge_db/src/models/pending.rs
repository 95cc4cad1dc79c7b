use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct PendingDownload {
    pub url: String,
    pub tenant: Option<String>,
    pub queued_at: DateTime<Utc>,
}
