use async_trait::async_trait;

use crate::prospect::ProspectSource;

/// Profile retrieval failed. Never retried by the core.
#[derive(Clone, Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid locator: {0}")]
    InvalidLocator(String),
    #[error("network error fetching {url}: {detail}")]
    Network { url: String, detail: String },
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },
    #[error("no profile text found at {0}")]
    Empty(String),
}

/// Turns a URL or identifier into cleaned natural-language profile text.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// The source recorded on prospects ingested through this fetcher.
    fn kind(&self) -> ProspectSource;

    async fn fetch(&self, locator: &str) -> Result<String, FetchError>;
}
