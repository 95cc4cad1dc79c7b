//! NFC tag writing: the NDEF message model, the transport seam and the
//! write orchestrator that drives it.

pub mod file_tag;
pub mod orchestrator;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub use file_tag::FileTagTransport;
pub use orchestrator::{WriteConfig, WriteOrchestrator, WriteOutcome, WriteState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NdefRecord {
    #[serde(rename = "recordType")]
    pub record_type: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NdefMessage {
    pub records: Vec<NdefRecord>,
}

impl NdefMessage {
    /// A single URL record, the only shape the writer produces.
    pub fn url(data: impl Into<String>) -> Self {
        Self {
            records: vec![NdefRecord { record_type: "url".to_string(), data: data.into() }],
        }
    }

    pub fn payload_bytes(&self) -> usize {
        self.records.iter().map(|r| r.data.len()).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Failures a transport can report. The names match the DOM exception
/// names NFC stacks use.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("NotAllowedError: {0}")]
    NotAllowed(String),
    #[error("NotSupportedError: {0}")]
    NotSupported(String),
    #[error("NotFoundError: {0}")]
    NotFound(String),
    #[error("NotReadableError: {0}")]
    NotReadable(String),
    #[error("NetworkError: {0}")]
    Network(String),
    #[error("AbortError: {0}")]
    Abort(String),
    #[error("TimeoutError: {0}")]
    Timeout(String),
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    pub fn name(&self) -> &'static str {
        match self {
            TransportError::NotAllowed(_) => "NotAllowedError",
            TransportError::NotSupported(_) => "NotSupportedError",
            TransportError::NotFound(_) => "NotFoundError",
            TransportError::NotReadable(_) => "NotReadableError",
            TransportError::Network(_) => "NetworkError",
            TransportError::Abort(_) => "AbortError",
            TransportError::Timeout(_) => "TimeoutError",
            TransportError::Other(_) => "Error",
        }
    }

    /// Timeouts and aborts end the write at once; everything else is retried.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransportError::Abort(_) | TransportError::Timeout(_))
    }

    pub fn readable(&self) -> String {
        match self {
            TransportError::NotAllowed(_) => "NFC permission was denied.".to_string(),
            TransportError::NotSupported(_) => "NFC is not supported on this device.".to_string(),
            TransportError::NotFound(_) => "No NFC tag found.".to_string(),
            TransportError::NotReadable(_) => "The NFC tag could not be read.".to_string(),
            TransportError::Network(_) => {
                "Connection to the tag was lost. Hold the tag still and try again.".to_string()
            }
            TransportError::Abort(_) => "The NFC operation was cancelled.".to_string(),
            TransportError::Timeout(_) => "Write operation timed out.".to_string(),
            TransportError::Other(message) if message.trim().is_empty() => "Unknown error.".to_string(),
            TransportError::Other(message) => message.clone(),
        }
    }
}

/// The tag hardware seam. Implementations must give up promptly once
/// `signal` is cancelled.
#[async_trait]
pub trait NfcTransport: Send + Sync {
    async fn write(&self, message: &NdefMessage, signal: CancellationToken) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_shape() {
        let message = NdefMessage::url("https://example.com#HK=HC123");
        let json: serde_json::Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"records": [{"recordType": "url", "data": "https://example.com#HK=HC123"}]})
        );
        assert_eq!(message.payload_bytes(), 28);
    }

    #[test]
    fn test_terminal_errors() {
        assert!(TransportError::Timeout(String::new()).is_terminal());
        assert!(TransportError::Abort(String::new()).is_terminal());
        assert!(!TransportError::Network(String::new()).is_terminal());
        assert!(!TransportError::Other("x".into()).is_terminal());
        assert_eq!(TransportError::Timeout(String::new()).name(), "TimeoutError");
        assert_eq!(TransportError::Other(" ".into()).readable(), "Unknown error.");
    }
}
