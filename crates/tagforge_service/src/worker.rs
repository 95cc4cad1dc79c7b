use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::cache::CacheCoordinator;
use crate::error::{Error, Result};
use crate::messages::{ClientMessage, SyncTag};
use crate::tenant::is_valid_tenant_id;

const COMMAND_BUFFER: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerCommand {
    Message(ClientMessage),
    Sync(SyncTag),
    Connectivity(bool),
    Drain,
}

/// Sending side of the background worker. The worker stops once every
/// handle is dropped.
#[derive(Clone)]
pub struct WorkerHandle {
    tx: mpsc::Sender<WorkerCommand>,
}

impl WorkerHandle {
    pub async fn send(&self, command: WorkerCommand) -> Result<()> {
        self.tx.send(command).await.map_err(|_| Error::WorkerClosed)
    }

    pub async fn post(&self, message: ClientMessage) -> Result<()> {
        self.send(WorkerCommand::Message(message)).await
    }

    /// Parses a page message in its JSON wire form and posts it.
    pub async fn post_json(&self, raw: &str) -> Result<()> {
        self.post(ClientMessage::from_json(raw)?).await
    }

    pub async fn register_sync(&self, tag: SyncTag) -> Result<()> {
        self.send(WorkerCommand::Sync(tag)).await
    }

    pub async fn set_online(&self, online: bool) -> Result<()> {
        self.send(WorkerCommand::Connectivity(online)).await
    }

    /// Visibility-change style nudge: retry the queue if online.
    pub async fn drain(&self) -> Result<()> {
        self.send(WorkerCommand::Drain).await
    }
}

pub fn spawn_worker(coordinator: CacheCoordinator, tenant: String) -> (WorkerHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    let task = tokio::spawn(run(coordinator, tenant, rx));
    (WorkerHandle { tx }, task)
}

async fn run(coordinator: CacheCoordinator, mut tenant: String, mut rx: mpsc::Receiver<WorkerCommand>) {
    tracing::info!("document worker started (tenant {})", tenant);

    while let Some(command) = rx.recv().await {
        if let Err(e) = handle(&coordinator, &mut tenant, command).await {
            tracing::error!("worker command failed: {}", e);
        }
    }

    tracing::info!("document worker stopped");
}

async fn handle(coordinator: &CacheCoordinator, tenant: &mut String, command: WorkerCommand) -> Result<()> {
    match command {
        WorkerCommand::Message(ClientMessage::CacheDoc { url, tenant: requested }) => {
            let target = match requested {
                Some(requested) if is_valid_tenant_id(&requested) => requested,
                Some(requested) => {
                    tracing::warn!("ignoring invalid tenant id '{}' for {}", requested, url);
                    tenant.clone()
                }
                None => tenant.clone(),
            };
            coordinator.cache_document(&url, Some(target.as_str())).await;
        }
        WorkerCommand::Message(ClientMessage::SetTenant { tenant_id }) => {
            if is_valid_tenant_id(&tenant_id) {
                tracing::info!("worker tenant set to {}", tenant_id);
                *tenant = tenant_id;
            } else {
                tracing::warn!("ignoring invalid tenant id '{}'", tenant_id);
            }
        }
        WorkerCommand::Message(ClientMessage::SkipWaiting) => {
            let deleted = coordinator.activate().await?;
            tracing::info!("activated; removed {} old cache(s)", deleted.len());
        }
        WorkerCommand::Sync(tag) => {
            coordinator.handle_sync(&tag, Some(tenant.as_str())).await;
        }
        WorkerCommand::Connectivity(online) => {
            coordinator.set_online(online).await;
        }
        WorkerCommand::Drain => {
            if coordinator.is_online() {
                coordinator.drain_pending().await;
            }
        }
    }
    Ok(())
}
