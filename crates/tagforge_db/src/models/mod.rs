pub mod cache_entry;
pub mod pending;

pub use cache_entry::{CacheEntry, NewCacheEntry, ResponseKind};
pub use pending::PendingDownload;
