pub mod cache;
pub mod pending;
pub mod settings;

pub use cache::CacheRepository;
pub use pending::PendingRepository;
pub use settings::SettingsRepository;
