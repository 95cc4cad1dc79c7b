use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::FromRow;

use crate::error::{Error, Result};

/// How a stored response may be used on replay. Opaque bodies come from a
/// foreign origin and are never inspected or rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Basic,
    Opaque,
}

impl ResponseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Basic => "basic",
            ResponseKind::Opaque => "opaque",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "basic" => Some(ResponseKind::Basic),
            "opaque" => Some(ResponseKind::Opaque),
            _ => None,
        }
    }
}

/// A response about to be written into a namespace.
#[derive(Debug, Clone)]
pub struct NewCacheEntry {
    pub namespace: String,
    pub url: String,
    pub kind: ResponseKind,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl NewCacheEntry {
    pub fn checksum(&self) -> String {
        hex::encode(Sha256::digest(&self.body))
    }
}

/// Row of `cache_entries`.
#[derive(Debug, Clone, FromRow)]
pub struct CacheEntry {
    pub namespace: String,
    pub url: String,
    pub kind: String,
    pub status: i64,
    pub headers_json: String,
    pub body: Vec<u8>,
    pub checksum: String,
    pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn response_kind(&self) -> Result<ResponseKind> {
        ResponseKind::parse(&self.kind).ok_or_else(|| Error::CorruptEntry {
            url: self.url.clone(),
            reason: format!("unknown response kind '{}'", self.kind),
        })
    }

    pub fn headers(&self) -> Result<Vec<(String, String)>> {
        serde_json::from_str(&self.headers_json).map_err(|e| Error::CorruptEntry {
            url: self.url.clone(),
            reason: e.to_string(),
        })
    }

    pub fn status_code(&self) -> u16 {
        u16::try_from(self.status).unwrap_or(200)
    }

    /// True when the stored body still hashes to the recorded checksum.
    pub fn is_intact(&self) -> bool {
        hex::encode(Sha256::digest(&self.body)) == self.checksum
    }
}
