//! Cache key derivation.

use std::fmt;

use axum::{body::Body, http::Request};

use crate::infra::http::RequestContext;

/// Identity of a cacheable request: its absolute URL.
///
/// Only `GET` requests reach the store, so the method is implied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Key a request by the absolute URL recorded in its [`RequestContext`],
    /// falling back to the raw request target.
    pub fn for_request(request: &Request<Body>) -> Self {
        match request.extensions().get::<RequestContext>() {
            Some(ctx) => Self(ctx.url.clone()),
            None => Self(request.uri().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
