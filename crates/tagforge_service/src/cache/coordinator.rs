use futures::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tagforge_db::{CacheRepository, PendingRepository};
use tokio::sync::broadcast;

use super::fetcher::{DocumentFetcher, FetchError};
use super::response::{BasicResponse, DocumentResponse};
use super::{
    CacheConfig, CacheOutcome, DocumentSource, DrainReport, InstallReport, LookupScope, OpenedDocument,
    BUILTIN_OFFLINE_PAGE,
};
use crate::error::Result;
use crate::event_log::EventLog;
use crate::messages::{SyncTag, WorkerNotification};
use crate::tenant::is_valid_tenant_id;

const NOTIFICATION_BUFFER: usize = 64;

#[derive(Clone)]
pub struct CacheCoordinator {
    fetcher: Arc<dyn DocumentFetcher>,
    store: CacheRepository,
    pending: PendingRepository,
    config: Arc<CacheConfig>,
    online: Arc<AtomicBool>,
    notifications: broadcast::Sender<WorkerNotification>,
    log: EventLog,
}

impl CacheCoordinator {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        store: CacheRepository,
        pending: PendingRepository,
        config: CacheConfig,
        log: EventLog,
    ) -> Self {
        let (notifications, _) = broadcast::channel(NOTIFICATION_BUFFER);
        Self {
            fetcher,
            store,
            pending,
            config: Arc::new(config),
            online: Arc::new(AtomicBool::new(true)),
            notifications,
            log,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkerNotification> {
        self.notifications.subscribe()
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn tenant_or_default<'a>(&'a self, tenant: Option<&'a str>) -> &'a str {
        match tenant {
            Some(t) if is_valid_tenant_id(t) => t,
            _ => &self.config.default_tenant,
        }
    }

    // =====================================================================
    // READ PATH
    // =====================================================================

    /// Network first, then the cache, then the offline placeholder. Store
    /// failures count as cache misses.
    pub async fn open_document(&self, url: &str, tenant: Option<&str>) -> OpenedDocument {
        let tenant = self.tenant_or_default(tenant);

        if self.is_online() {
            match self.fetch(url).await {
                Ok(response) => {
                    let namespace = self.config.doc_namespace(tenant);
                    if let Err(e) = self.store.put(&prepare_for_storage(&response).to_entry(&namespace, url)).await {
                        self.log.err(format!("Could not save {} for offline use ({}): {}", url, namespace, e));
                    }
                    return OpenedDocument { response, source: DocumentSource::Network };
                }
                Err(e) => tracing::info!("network read of {} failed, trying cache: {}", url, e),
            }
        }

        match self.cached_copy(url, tenant).await {
            Ok(Some(opened)) => return opened,
            Ok(None) => {}
            Err(e) => self.log.err(format!("Offline cache unavailable: {}", e)),
        }

        self.log.info(format!("{} is not available offline", url));
        OpenedDocument { response: self.offline_placeholder().await, source: DocumentSource::Placeholder }
    }

    async fn cached_copy(&self, url: &str, tenant: &str) -> Result<Option<OpenedDocument>> {
        let namespaces = self.lookup_order(tenant).await?;
        let Some(entry) = self.store.find_first(&namespaces, url).await? else {
            return Ok(None);
        };

        let namespace = entry.namespace.clone();
        match DocumentResponse::from_entry(entry) {
            Ok(response) => {
                tracing::info!("served {} from {}", url, namespace);
                Ok(Some(OpenedDocument { response, source: DocumentSource::Cache { namespace } }))
            }
            Err(e) => {
                tracing::warn!("ignoring unreadable cache entry in {}: {}", namespace, e);
                Ok(None)
            }
        }
    }

    /// Namespaces a read may search, in search order.
    pub async fn lookup_order(&self, tenant: &str) -> Result<Vec<String>> {
        let own = self.config.doc_namespace(tenant);
        if self.config.lookup_scope == LookupScope::TenantOnly {
            return Ok(vec![own]);
        }

        let mut order = vec![own.clone()];
        for namespace in self.store.list_namespaces().await? {
            if namespace != own && self.config.is_doc_namespace(&namespace) {
                order.push(namespace);
            }
        }
        Ok(order)
    }

    async fn offline_placeholder(&self) -> DocumentResponse {
        match self.store.get(&self.config.core_namespace(), &self.config.offline_page).await {
            Ok(Some(entry)) => match DocumentResponse::from_entry(entry) {
                Ok(response) => return response,
                Err(e) => tracing::warn!("offline page unreadable: {}", e),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!("offline page lookup failed: {}", e),
        }

        DocumentResponse::Basic(BasicResponse::new(
            200,
            vec![("Content-Type".to_string(), "text/html; charset=utf-8".to_string())],
            BUILTIN_OFFLINE_PAGE.as_bytes().to_vec(),
        ))
    }

    // =====================================================================
    // WRITE PATH
    // =====================================================================

    /// Caches `url` into the tenant's namespace, or queues it while offline.
    /// Store failures are reported as `CacheOutcome::Failed`.
    pub async fn cache_document(&self, url: &str, tenant: Option<&str>) -> CacheOutcome {
        let tenant = self.tenant_or_default(tenant);

        if !self.is_online() {
            return self.enqueue(url, tenant).await;
        }

        match self.fetch(url).await {
            Ok(response) => self.store_document(url, tenant, &response).await,
            Err(e) if e.is_connectivity() => self.enqueue(url, tenant).await,
            Err(e) => self.report_failure(url, tenant, e.to_string()),
        }
    }

    async fn store_document(&self, url: &str, tenant: &str, response: &DocumentResponse) -> CacheOutcome {
        let namespace = self.config.doc_namespace(tenant);
        let entry = prepare_for_storage(response).to_entry(&namespace, url);

        match self.store.put(&entry).await {
            Ok(()) => {
                self.log.ok(format!("{} saved for offline use ({})", url, tenant));
                self.notify(WorkerNotification::DocCached { url: url.to_string(), tenant: tenant.to_string() });
                CacheOutcome::Cached { namespace }
            }
            Err(e) => self.report_failure(url, tenant, format!("could not store document: {}", e)),
        }
    }

    async fn enqueue(&self, url: &str, tenant: &str) -> CacheOutcome {
        match self.pending.enqueue(url, Some(tenant)).await {
            Ok(true) => self.log.info(format!("Offline: {} will download when the connection returns", url)),
            Ok(false) => tracing::debug!("{} already queued", url),
            Err(e) => return self.report_failure(url, tenant, format!("could not queue download: {}", e)),
        }
        CacheOutcome::Queued
    }

    fn report_failure(&self, url: &str, tenant: &str, reason: String) -> CacheOutcome {
        self.log.err(format!("Caching {} failed: {}", url, reason));
        self.notify(WorkerNotification::DocCacheFailed {
            url: url.to_string(),
            tenant: tenant.to_string(),
            error: reason.clone(),
        });
        CacheOutcome::Failed { reason }
    }

    fn notify(&self, notification: WorkerNotification) {
        // No subscribers is fine
        let _ = self.notifications.send(notification);
    }

    async fn fetch(&self, url: &str) -> std::result::Result<DocumentResponse, FetchError> {
        match tokio::time::timeout(self.config.fetch_timeout, self.fetcher.fetch(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Offline(format!("no response within {:?}", self.config.fetch_timeout))),
        }
    }

    // =====================================================================
    // RETRY QUEUE
    // =====================================================================

    /// Flips the connectivity flag. Coming back online drains the queue.
    pub async fn set_online(&self, online: bool) -> Option<DrainReport> {
        let was_online = self.online.swap(online, Ordering::SeqCst);
        if online && !was_online {
            tracing::info!("connection restored");
            return Some(self.drain_pending().await);
        }
        if !online && was_online {
            tracing::info!("connection lost");
        }
        None
    }

    /// Retries every queued document. Successes leave the queue; failures
    /// stay for the next drain.
    pub async fn drain_pending(&self) -> DrainReport {
        let mut report = DrainReport::default();
        let queued = match self.pending.list().await {
            Ok(queued) => queued,
            Err(e) => {
                self.log.err(format!("Download queue unavailable: {}", e));
                return report;
            }
        };

        if !self.is_online() {
            report.remaining = queued.into_iter().map(|p| p.url).collect();
            return report;
        }

        for item in queued {
            let outcome = self.cache_document(&item.url, item.tenant.as_deref()).await;
            if matches!(outcome, CacheOutcome::Cached { .. }) && self.dequeue(&item.url).await {
                report.cached.push(item.url);
            } else {
                report.remaining.push(item.url);
            }
        }

        if !report.cached.is_empty() {
            self.log.ok(format!(
                "{} queued document(s) downloaded, {} left",
                report.cached.len(),
                report.remaining.len()
            ));
        }
        report
    }

    /// Removes `url` from the queue. A failed removal leaves it queued.
    async fn dequeue(&self, url: &str) -> bool {
        match self.pending.remove(url).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("could not remove {} from the download queue: {}", url, e);
                false
            }
        }
    }

    pub async fn handle_sync(&self, tag: &SyncTag, tenant: Option<&str>) -> CacheOutcome {
        match tag {
            SyncTag::CacheDoc { url } => {
                let outcome = self.cache_document(url, tenant).await;
                if matches!(outcome, CacheOutcome::Cached { .. }) {
                    self.dequeue(url).await;
                }
                outcome
            }
        }
    }

    // =====================================================================
    // VERSIONING
    // =====================================================================

    /// Precaches the core assets into the current core namespace. Assets
    /// that fail are skipped.
    pub async fn install(&self, core_assets: &[String]) -> InstallReport {
        let namespace = self.config.core_namespace();
        tracing::info!("precaching {} core asset(s) into {}", core_assets.len(), namespace);

        let results = join_all(core_assets.iter().map(|asset| {
            let namespace = namespace.clone();
            async move {
                let response = self.fetch(asset).await.map_err(|e| e.to_string())?;
                self.store
                    .put(&response.to_entry(&namespace, asset))
                    .await
                    .map_err(|e| e.to_string())
            }
        }))
        .await;

        let mut report = InstallReport::default();
        for (asset, result) in core_assets.iter().zip(results) {
            match result {
                Ok(()) => report.cached += 1,
                Err(e) => {
                    tracing::warn!("skipping asset {}: {}", asset, e);
                    report.skipped.push(asset.clone());
                }
            }
        }
        report
    }

    /// Deletes every namespace that is neither the current core namespace
    /// nor a document namespace. Returns the deleted names.
    pub async fn activate(&self) -> Result<Vec<String>> {
        let core = self.config.core_namespace();
        let mut deleted = Vec::new();

        for namespace in self.store.list_namespaces().await? {
            if namespace == core || self.config.is_doc_namespace(&namespace) {
                continue;
            }
            let entries = self.store.delete_namespace(&namespace).await?;
            tracing::info!("deleted old cache {} ({} entries)", namespace, entries);
            deleted.push(namespace);
        }
        Ok(deleted)
    }
}

/// Same-origin documents are stored with `Content-Disposition: inline` so
/// they open in place; opaque responses are stored untouched.
fn prepare_for_storage(response: &DocumentResponse) -> DocumentResponse {
    match response {
        DocumentResponse::Basic(basic) => DocumentResponse::Basic(basic.with_header("Content-Disposition", "inline")),
        DocumentResponse::Opaque(_) => response.clone(),
    }
}
