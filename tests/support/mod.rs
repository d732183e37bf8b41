#![allow(dead_code)]

use std::num::{NonZeroU32, NonZeroUsize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes},
    http::{Request, Response, header::HOST},
};
use hotfeed::{
    application::{
        feed::{FeedService, FeedSources},
        syndication::{SyndicationConfig, SyndicationService},
        upstream::{PageSource, UpstreamError},
    },
    cache::{CacheConfig, CacheState, MemoryResponseStore},
    infra::http::{HttpState, RequestOrigin, build_router},
};
use tower::ServiceExt;
use url::Url;

pub const DUNE_PAGE: &str = include_str!("../fixtures/popular_movies.html");
pub const MAX_AGE_SECONDS: u32 = 3600;

/// Scripted upstream that counts how often it was asked.
pub struct StubSource {
    reply: Mutex<Result<String, UpstreamError>>,
    fetches: AtomicUsize,
}

impl StubSource {
    pub fn serving(body: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(Ok(body.to_string())),
            fetches: AtomicUsize::new(0),
        })
    }

    pub fn failing(error: UpstreamError) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(Err(error)),
            fetches: AtomicUsize::new(0),
        })
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageSource for StubSource {
    async fn fetch_page(&self, url: &Url) -> Result<String, UpstreamError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match &*self.reply.lock().unwrap() {
            Ok(body) => Ok(body.clone()),
            Err(UpstreamError::Timeout { .. }) => Err(UpstreamError::Timeout {
                url: url.to_string(),
            }),
            Err(UpstreamError::Status { status, .. }) => Err(UpstreamError::Status {
                url: url.to_string(),
                status: *status,
            }),
            Err(other) => Err(UpstreamError::Transport {
                url: url.to_string(),
                message: other.to_string(),
            }),
        }
    }
}

pub fn sources() -> FeedSources {
    FeedSources {
        movies: Url::parse("https://editorial.rottentomatoes.com/guide/popular-movies/").unwrap(),
        shows: Url::parse("https://editorial.rottentomatoes.com/guide/popular-tv-shows/").unwrap(),
    }
}

pub fn router(source: Arc<StubSource>, cached: bool) -> Router {
    build(source, sources(), cached)
}

/// Uncached router over an arbitrary page source.
pub fn router_with(source: Arc<dyn PageSource>, listings: FeedSources) -> Router {
    build(source, listings, false)
}

fn build(source: Arc<dyn PageSource>, listings: FeedSources, cached: bool) -> Router {
    let syndication = SyndicationService::new(SyndicationConfig {
        source_name: "RottenTomatoes".to_string(),
        stamp_fetch_time: false,
        ttl_minutes: Some(60),
    });
    let state = HttpState {
        feeds: Arc::new(FeedService::new(source, listings, syndication)),
        max_age: NonZeroU32::new(MAX_AGE_SECONDS).unwrap(),
    };
    let cache = cached.then(|| {
        let config = CacheConfig {
            max_entries: NonZeroUsize::new(8).unwrap(),
            ..CacheConfig::default()
        };
        let store = Arc::new(MemoryResponseStore::new(&config));
        CacheState::new(config, store)
    });

    let origin = RequestOrigin {
        public_url: None,
        listen_addr: Some("127.0.0.1:8787".parse().unwrap()),
    };
    build_router(state, cache, origin)
}

pub async fn get(router: &Router, path: &str) -> (Response<Body>, Bytes) {
    let request = Request::builder()
        .uri(path)
        .header(HOST, "localhost:8787")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    (Response::from_parts(parts, Body::empty()), bytes)
}
