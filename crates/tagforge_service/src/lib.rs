pub mod brand;
pub mod cache;
pub mod error;
pub mod event_log;
pub mod messages;
pub mod nfc;
pub mod tenant;
pub mod worker;

pub use brand::BrandConfig;
pub use cache::{CacheConfig, CacheCoordinator, CacheOutcome, LookupScope};
pub use error::{Error, Result};
pub use event_log::EventLog;
pub use messages::{ClientMessage, SyncTag, WorkerNotification};
pub use nfc::{NfcTransport, WriteConfig, WriteOrchestrator, WriteOutcome, WriteState};
pub use tenant::TenantResolver;
pub use worker::{spawn_worker, WorkerHandle};
