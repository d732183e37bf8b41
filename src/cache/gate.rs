//! Response cache middleware.
//!
//! Serves stored responses for repeated `GET` requests and stores fresh
//! `200 OK` responses for as long as their `Cache-Control: max-age` allows.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, HttpBody},
    extract::State,
    http::{HeaderValue, Method, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::BodyExt;
use metrics::counter;
use tracing::{debug, instrument, warn};

use super::{
    CacheConfig, METRIC_CACHE_HIT, METRIC_CACHE_MISS, METRIC_CACHE_STORE,
    keys::CacheKey,
    store::{CachedResponse, ResponseStore},
};

/// Response header reporting whether the cache answered the request.
pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// Shared cache state for the middleware.
#[derive(Clone)]
pub struct CacheState {
    pub config: CacheConfig,
    pub store: Arc<dyn ResponseStore>,
}

impl CacheState {
    pub fn new(config: CacheConfig, store: Arc<dyn ResponseStore>) -> Self {
        Self { config, store }
    }
}

/// Middleware for response caching.
///
/// Only `GET` requests are looked up. A miss runs the inner service and
/// stores the outcome when [`freshness_lifetime`] says it may be reused.
#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn response_cache_layer(
    State(cache): State<CacheState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !cache.config.enabled || request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = CacheKey::for_request(&request);

    if let Some(cached) = cache.store.lookup(&key).await {
        counter!(METRIC_CACHE_HIT).increment(1);
        debug!(cache = "response", outcome = "hit", key = %key, "serving cached response");
        let mut response = cached.into_response();
        response.headers_mut().insert(CACHE_STATUS_HEADER, HeaderValue::from_static("HIT"));
        return response;
    }

    counter!(METRIC_CACHE_MISS).increment(1);
    debug!(cache = "response", outcome = "miss", key = %key, "cache miss, executing handler");

    let response = next.run(request).await;

    let Some(ttl) = freshness_lifetime(&response) else {
        return response;
    };

    let within_limit = response
        .body()
        .size_hint()
        .upper()
        .is_some_and(|upper| upper <= cache.config.body_limit_bytes as u64);
    if !within_limit {
        debug!(key = %key, "response body too large to cache");
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            warn!(key = %key, error = %err, "failed to buffer response body");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let cached = CachedResponse::new(parts.status, &parts.headers, bytes.clone());
    cache.store.store(key.clone(), cached, ttl).await;
    counter!(METRIC_CACHE_STORE).increment(1);
    debug!(key = %key, ttl_seconds = ttl.as_secs(), "stored response");

    parts.headers.insert(CACHE_STATUS_HEADER, HeaderValue::from_static("MISS"));
    Response::from_parts(parts, Body::from(bytes))
}

/// How long `response` may be reused, if at all.
///
/// Only `200 OK` responses with a positive `max-age` qualify; `no-store`
/// and `private` opt out.
pub fn freshness_lifetime(response: &Response) -> Option<Duration> {
    if response.status() != StatusCode::OK {
        return None;
    }

    let mut max_age = None;
    for value in response.headers().get_all(header::CACHE_CONTROL) {
        let Ok(value) = value.to_str() else {
            continue;
        };
        for directive in value.split(',').map(str::trim) {
            let (name, argument) = match directive.split_once('=') {
                Some((name, argument)) => (name.trim(), Some(argument.trim().trim_matches('"'))),
                None => (directive, None),
            };
            if name.eq_ignore_ascii_case("no-store") || name.eq_ignore_ascii_case("private") {
                return None;
            }
            if name.eq_ignore_ascii_case("max-age") {
                max_age = argument.and_then(|seconds| seconds.parse::<u64>().ok());
            }
        }
    }

    max_age
        .filter(|seconds| *seconds > 0)
        .map(Duration::from_secs)
}
