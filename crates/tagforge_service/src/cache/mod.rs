//! Offline document cache: tenant-partitioned namespaces, network-first
//! reads and a persisted retry queue for documents requested offline.

pub mod coordinator;
pub mod fetcher;
pub mod response;

use serde::Serialize;
use std::time::Duration;

pub use coordinator::CacheCoordinator;
pub use fetcher::{DocumentFetcher, FetchError, HttpFetcher};
pub use response::{BasicResponse, DocumentResponse, OpaqueResponse};

/// Body served when a document is neither reachable nor cached and the
/// core namespace has no offline page either.
pub const BUILTIN_OFFLINE_PAGE: &str = "<!doctype html><html><head><meta charset=\"utf-8\"><title>Offline</title></head>\
<body><h1>Offline</h1><p>This document is not available offline yet.</p></body></html>";

/// Which tenant namespaces a cache read may search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LookupScope {
    /// Every document namespace, the requesting tenant's first.
    #[default]
    AllTenants,
    TenantOnly,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub doc_cache_prefix: String,
    pub core_cache_prefix: String,
    pub version: u32,
    pub default_tenant: String,
    pub lookup_scope: LookupScope,
    pub fetch_timeout: Duration,
    pub offline_page: String,
    pub core_assets: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            doc_cache_prefix: "tagforge-docs".to_string(),
            core_cache_prefix: "tagforge-core".to_string(),
            version: 1,
            default_tenant: "default".to_string(),
            lookup_scope: LookupScope::AllTenants,
            fetch_timeout: Duration::from_secs(10),
            offline_page: "offline.html".to_string(),
            core_assets: vec![
                "offline.html".to_string(),
                "index.html".to_string(),
                "core/theme.css".to_string(),
                "core/app.js".to_string(),
                "core/schema.js".to_string(),
                "core/lang/de.json".to_string(),
                "core/lang/en.json".to_string(),
            ],
        }
    }
}

impl CacheConfig {
    /// `{core_prefix}-v{version}`
    pub fn core_namespace(&self) -> String {
        format!("{}-v{}", self.core_cache_prefix, self.version)
    }

    /// `{doc_prefix}-{tenant}`
    pub fn doc_namespace(&self, tenant: &str) -> String {
        format!("{}-{}", self.doc_cache_prefix, tenant)
    }

    pub fn is_doc_namespace(&self, namespace: &str) -> bool {
        namespace
            .strip_prefix(&self.doc_cache_prefix)
            .is_some_and(|rest| rest.len() > 1 && rest.starts_with('-'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum CacheOutcome {
    Cached { namespace: String },
    Queued,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Network,
    Cache { namespace: String },
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedDocument {
    pub response: DocumentResponse,
    pub source: DocumentSource,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    pub cached: Vec<String>,
    pub remaining: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub cached: usize,
    pub skipped: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_names() {
        let config = CacheConfig { version: 45, ..CacheConfig::default() };
        assert_eq!(config.core_namespace(), "tagforge-core-v45");
        assert_eq!(config.doc_namespace("acme"), "tagforge-docs-acme");

        assert!(config.is_doc_namespace("tagforge-docs-acme"));
        assert!(!config.is_doc_namespace("tagforge-docs"));
        assert!(!config.is_doc_namespace("tagforge-docs-"));
        assert!(!config.is_doc_namespace("tagforge-core-v44"));
    }
}
