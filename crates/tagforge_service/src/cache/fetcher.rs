use async_trait::async_trait;
use thiserror::Error;
use url::{Origin, Url};

use super::response::{BasicResponse, DocumentResponse, OpaqueResponse};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No connection to the server. Requests failing this way are queued.
    #[error("Offline: {0}")]
    Offline(String),

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("Fetch failed: {0}")]
    Other(String),
}

impl FetchError {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, FetchError::Offline(_))
    }
}

/// The network seam of the cache coordinator.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<DocumentResponse, FetchError>;
}

/// `reqwest` fetcher. Relative URLs resolve against the app base; responses
/// from another origin come back opaque.
pub struct HttpFetcher {
    client: reqwest::Client,
    base: Url,
    origin: Origin,
}

impl HttpFetcher {
    pub fn new(app_base: &str) -> Result<Self, FetchError> {
        let base = Url::parse(app_base).map_err(|_| FetchError::InvalidUrl(app_base.to_string()))?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| FetchError::Other(e.to_string()))?;
        let origin = base.origin();
        Ok(Self { client, base, origin })
    }

    pub fn resolve(&self, url: &str) -> Result<Url, FetchError> {
        self.base.join(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))
    }

    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.origin
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<DocumentResponse, FetchError> {
        let target = self.resolve(url)?;
        let same_origin = self.is_same_origin(&target);

        let response = self.client.get(target.clone()).send().await.map_err(request_error)?;
        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
            .collect();
        let body = response.bytes().await.map_err(request_error)?.to_vec();

        if !same_origin {
            return Ok(DocumentResponse::Opaque(OpaqueResponse::new(body)));
        }

        let response = BasicResponse::new(status, headers, body);
        if !response.is_success() {
            return Err(FetchError::Status { url: target.to_string(), status });
        }
        Ok(DocumentResponse::Basic(response))
    }
}

fn request_error(error: reqwest::Error) -> FetchError {
    if error.is_connect() || error.is_timeout() {
        FetchError::Offline(error.to_string())
    } else {
        FetchError::Other(error.to_string())
    }
}
