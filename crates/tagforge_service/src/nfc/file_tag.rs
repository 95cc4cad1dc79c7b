use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

use super::{NdefMessage, NfcTransport, TransportError};

/// Writes the NDEF message as JSON to a file that stands in for the tag.
/// An optional capacity emulates the tag's user memory: larger payloads
/// fail with `NetworkError`, like a real tag that drops the connection.
#[derive(Debug, Clone)]
pub struct FileTagTransport {
    path: PathBuf,
    capacity: Option<usize>,
}

impl FileTagTransport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), capacity: None }
    }

    pub fn with_capacity(mut self, bytes: usize) -> Self {
        self.capacity = Some(bytes);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads back what was last written to the tag file.
    pub async fn read(&self) -> Result<NdefMessage, TransportError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(io_error)?;
        serde_json::from_str(&raw).map_err(|e| TransportError::NotReadable(e.to_string()))
    }
}

#[async_trait]
impl NfcTransport for FileTagTransport {
    async fn write(&self, message: &NdefMessage, signal: CancellationToken) -> Result<(), TransportError> {
        if signal.is_cancelled() {
            return Err(TransportError::Abort("cancelled before write".to_string()));
        }

        if let Some(capacity) = self.capacity {
            let size = message.payload_bytes();
            if size > capacity {
                return Err(TransportError::Network(format!("{} bytes do not fit into {} bytes", size, capacity)));
            }
        }

        let json = message.to_json().map_err(|e| TransportError::Other(e.to_string()))?;
        tokio::fs::write(&self.path, json).await.map_err(io_error)?;
        tracing::debug!("tag file written: {}", self.path.display());
        Ok(())
    }
}

fn io_error(error: std::io::Error) -> TransportError {
    match error.kind() {
        ErrorKind::PermissionDenied => TransportError::NotAllowed(error.to_string()),
        ErrorKind::NotFound => TransportError::NotFound(error.to_string()),
        _ => TransportError::Other(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let tag = FileTagTransport::new(dir.path().join("tag.json"));
        let message = NdefMessage::url("https://example.com#HK=HC123");

        tag.write(&message, CancellationToken::new()).await.unwrap();
        assert_eq!(tag.read().await.unwrap(), message);
    }

    #[tokio::test]
    async fn test_capacity_and_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        let tag = FileTagTransport::new(dir.path().join("tag.json")).with_capacity(10);
        let message = NdefMessage::url("https://example.com#HK=HC123");

        let err = tag.write(&message, CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.name(), "NetworkError");

        let signal = CancellationToken::new();
        signal.cancel();
        let err = tag.write(&NdefMessage::url("x"), signal).await.unwrap_err();
        assert_eq!(err.name(), "AbortError");
        assert_eq!(tag.read().await.unwrap_err().name(), "NotFoundError");
    }
}
