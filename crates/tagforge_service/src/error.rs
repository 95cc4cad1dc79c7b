use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Store error: {0}")]
    Store(#[from] tagforge_db::Error),

    #[error(transparent)]
    Core(#[from] tagforge_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid sync tag: '{0}'")]
    InvalidSyncTag(String),

    #[error("Invalid worker message: {0}")]
    InvalidMessage(String),

    #[error("Brand configuration error: {0}")]
    Brand(String),

    #[error("Worker is not running")]
    WorkerClosed,
}

pub type Result<T> = std::result::Result<T, Error>;
