use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Schema asset missing: {0}")]
    MissingAsset(String),

    #[error("Schema asset is not valid UTF-8: {0}")]
    InvalidAsset(String),

    #[error("Corrupt cache entry for {url}: {reason}")]
    CorruptEntry { url: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
