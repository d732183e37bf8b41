//! Port describing where listing pages come from.

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to `{url}` failed: {message}")]
    Transport { url: String, message: String },
    #[error("`{url}` answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("request to `{url}` timed out")]
    Timeout { url: String },
    #[error("failed to read body from `{url}`: {message}")]
    Body { url: String, message: String },
}

impl UpstreamError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, UpstreamError::Timeout { .. })
    }
}

/// Fetches the raw HTML of a listing page with a plain GET.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &Url) -> Result<String, UpstreamError>;
}
