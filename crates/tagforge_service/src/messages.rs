use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

const CACHE_DOC_TAG_PREFIX: &str = "cache-doc:";

/// Deferred work registered while offline, in its wire form
/// `"cache-doc:<url>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncTag {
    CacheDoc { url: String },
}

impl fmt::Display for SyncTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncTag::CacheDoc { url } => write!(f, "{}{}", CACHE_DOC_TAG_PREFIX, url),
        }
    }
}

impl FromStr for SyncTag {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.strip_prefix(CACHE_DOC_TAG_PREFIX) {
            Some(url) if !url.trim().is_empty() => Ok(SyncTag::CacheDoc { url: url.to_string() }),
            _ => Err(Error::InvalidSyncTag(raw.to_string())),
        }
    }
}

/// Page -> worker messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawClientMessage", into = "RawClientMessage")]
pub enum ClientMessage {
    CacheDoc { url: String, tenant: Option<String> },
    SkipWaiting,
    SetTenant { tenant_id: String },
}

impl ClientMessage {
    pub fn from_json(raw: &str) -> crate::Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::InvalidMessage(e.to_string()))
    }
}

// Both historical shapes share one object: `{action: ...}` for document
// caching, `{type: ...}` for lifecycle messages.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RawClientMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tenant: Option<String>,
    #[serde(rename = "tenantId", default, skip_serializing_if = "Option::is_none")]
    tenant_id: Option<String>,
}

impl TryFrom<RawClientMessage> for ClientMessage {
    type Error = String;

    fn try_from(raw: RawClientMessage) -> Result<Self, Self::Error> {
        if raw.action.as_deref() == Some("cache-doc") {
            let url = raw.url.filter(|u| !u.trim().is_empty()).ok_or("cache-doc without url")?;
            let tenant = raw.tenant.filter(|t| !t.trim().is_empty());
            return Ok(ClientMessage::CacheDoc { url, tenant });
        }

        match raw.kind.as_deref() {
            Some("SKIP_WAITING") => Ok(ClientMessage::SkipWaiting),
            Some("SET_TENANT") => {
                let tenant_id = raw.tenant_id.filter(|t| !t.trim().is_empty()).ok_or("SET_TENANT without tenantId")?;
                Ok(ClientMessage::SetTenant { tenant_id })
            }
            Some(other) => Err(format!("unknown message type '{}'", other)),
            None => match raw.action {
                Some(action) => Err(format!("unknown action '{}'", action)),
                None => Err("message has neither action nor type".to_string()),
            },
        }
    }
}

impl From<ClientMessage> for RawClientMessage {
    fn from(message: ClientMessage) -> Self {
        match message {
            ClientMessage::CacheDoc { url, tenant } => RawClientMessage {
                action: Some("cache-doc".to_string()),
                url: Some(url),
                tenant,
                ..Default::default()
            },
            ClientMessage::SkipWaiting => RawClientMessage {
                kind: Some("SKIP_WAITING".to_string()),
                ..Default::default()
            },
            ClientMessage::SetTenant { tenant_id } => RawClientMessage {
                kind: Some("SET_TENANT".to_string()),
                tenant_id: Some(tenant_id),
                ..Default::default()
            },
        }
    }
}

/// Worker -> page notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkerNotification {
    #[serde(rename = "doc-cached", alias = "DOC_CACHED")]
    DocCached { url: String, tenant: String },

    #[serde(rename = "doc-cache-failed")]
    DocCacheFailed { url: String, tenant: String, error: String },
}
