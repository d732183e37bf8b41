use std::{num::NonZeroU32, sync::Arc};

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{
        HeaderValue, Request, StatusCode,
        header::{CACHE_CONTROL, CONTENT_TYPE},
    },
    middleware,
    response::{IntoResponse, Response},
    routing::any,
};

use crate::{
    application::{error::HttpError, feed::FeedService},
    cache::{CacheState, response_cache_layer},
    domain::{FeedKind, error::DomainError},
};

use super::middleware::{RequestContext, RequestOrigin, log_responses, set_request_context};

pub const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";

#[derive(Clone)]
pub struct HttpState {
    pub feeds: Arc<FeedService>,
    /// Freshness advertised on every rendered feed.
    pub max_age: NonZeroU32,
}

pub fn build_router(
    state: HttpState,
    cache: Option<CacheState>,
    origin: RequestOrigin,
) -> Router {
    let routes = Router::new()
        .route("/{feed}", any(rss_feed))
        .fallback(not_found)
        .with_state(state);

    let routes = if let Some(cache_state) = cache {
        routes.layer(middleware::from_fn_with_state(
            cache_state,
            response_cache_layer,
        ))
    } else {
        routes
    };

    routes
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn_with_state(origin, set_request_context))
}

async fn rss_feed(State(state): State<HttpState>, request: Request<Body>) -> Response {
    let kind = match FeedKind::from_path(request.uri().path()) {
        Ok(kind) => kind,
        Err(err) => return HttpError::from(err).into_response(),
    };

    let self_link = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.url.clone())
        .unwrap_or_else(|| request.uri().to_string());

    match state.feeds.rss_feed(kind, &self_link).await {
        Ok(feed) => rss_response(feed.body, state.max_age),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn not_found(request: Request<Body>) -> Response {
    HttpError::from(DomainError::unknown_feed(request.uri().path())).into_response()
}

fn rss_response(body: String, max_age: NonZeroU32) -> Response {
    let cache_control = HeaderValue::from_str(&format!("max-age={max_age}"))
        .unwrap_or_else(|_| HeaderValue::from_static("no-store"));

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, RSS_CONTENT_TYPE)
        .header(CACHE_CONTROL, cache_control)
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
