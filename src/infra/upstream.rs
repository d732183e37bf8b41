//! `reqwest`-backed listing fetcher.

use std::time::Instant;

use async_trait::async_trait;
use metrics::histogram;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::application::upstream::{PageSource, UpstreamError};
use crate::config::UpstreamSettings;

use super::error::InfraError;

pub const METRIC_UPSTREAM_FETCH_MS: &str = "hotfeed_upstream_fetch_ms";

#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new(settings: &UpstreamSettings) -> Result<Self, InfraError> {
        let mut builder = Client::builder().user_agent(settings.user_agent.clone());
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| InfraError::http(format!("failed to build HTTP client: {err}")))?;

        Ok(Self { client })
    }

    fn transport_error(url: &Url, err: reqwest::Error) -> UpstreamError {
        if err.is_timeout() {
            UpstreamError::Timeout {
                url: url.to_string(),
            }
        } else {
            UpstreamError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch_page(&self, url: &Url) -> Result<String, UpstreamError> {
        let started_at = Instant::now();
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| Self::transport_error(url, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|err| {
            if err.is_timeout() {
                UpstreamError::Timeout {
                    url: url.to_string(),
                }
            } else {
                UpstreamError::Body {
                    url: url.to_string(),
                    message: err.to_string(),
                }
            }
        })?;

        histogram!(METRIC_UPSTREAM_FETCH_MS).record(started_at.elapsed().as_secs_f64() * 1000.0);
        debug!(bytes = body.len(), "fetched listing page");
        Ok(body)
    }
}

