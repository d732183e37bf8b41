use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use tracing::{info, instrument};
use url::Url;

use crate::application::extract::{ExtractError, extract_records};
use crate::application::syndication::{FeedRequest, RenderedFeed, SyndicationService};
use crate::application::upstream::{PageSource, UpstreamError};
use crate::application::validate::{ValidationError, validate};
use crate::config::UpstreamSettings;
use crate::domain::FeedKind;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Listing page behind each published feed.
#[derive(Debug, Clone)]
pub struct FeedSources {
    pub movies: Url,
    pub shows: Url,
}

impl FeedSources {
    pub fn url_for(&self, kind: FeedKind) -> &Url {
        match kind {
            FeedKind::Movies => &self.movies,
            FeedKind::Shows => &self.shows,
        }
    }
}

impl From<&UpstreamSettings> for FeedSources {
    fn from(settings: &UpstreamSettings) -> Self {
        Self {
            movies: settings.movies_url.clone(),
            shows: settings.shows_url.clone(),
        }
    }
}

/// Fetch, extract, validate and render one feed per call.
#[derive(Clone)]
pub struct FeedService {
    source: Arc<dyn PageSource>,
    sources: FeedSources,
    syndication: SyndicationService,
}

impl FeedService {
    pub fn new(
        source: Arc<dyn PageSource>,
        sources: FeedSources,
        syndication: SyndicationService,
    ) -> Self {
        Self {
            source,
            sources,
            syndication,
        }
    }

    /// Build the RSS document for `kind`, advertised at `self_link`.
    ///
    /// Nothing is rendered unless every scraped record carries a URL.
    #[instrument(skip(self))]
    pub async fn rss_feed(&self, kind: FeedKind, self_link: &str) -> Result<RenderedFeed, FeedError> {
        let upstream_url = self.sources.url_for(kind).clone();
        let html = self.source.fetch_page(&upstream_url).await?;
        let fetched_at = OffsetDateTime::now_utc();

        let records = validate(extract_records(&html)?)?;

        let request = FeedRequest {
            kind,
            upstream_url,
            self_link: self_link.to_string(),
            fetched_at,
        };
        let feed = self.syndication.rss_feed(&records, &request);

        info!(
            target = "application::feed::rss_feed",
            entries = feed.entries,
            bytes = feed.body.len(),
            "rendered feed"
        );

        Ok(feed)
    }
}
