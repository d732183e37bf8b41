use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Request, Uri, header::HOST},
    middleware::Next,
    response::Response,
};
use tracing::{error, info, warn};
use url::Url;
use uuid::Uuid;

use crate::application::error::ErrorReport;
use crate::cache::CACHE_STATUS_HEADER;

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    /// Absolute URL the client asked for; doubles as the feed self link.
    pub url: String,
}

/// Where self links point when the request alone cannot say.
#[derive(Debug, Clone, Default)]
pub struct RequestOrigin {
    /// Configured public base; wins over everything the request carries.
    pub public_url: Option<Url>,
    /// Listener address, used when a request has no `Host` header.
    pub listen_addr: Option<SocketAddr>,
}

pub async fn set_request_context(
    State(origin): State<RequestOrigin>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let host = request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let ctx = RequestContext {
        request_id: Uuid::new_v4().to_string(),
        url: absolute_url(&origin, host.as_deref(), request.uri()),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

/// `<public_url><path?query>` when configured, otherwise rebuilt from the
/// `Host` header or, failing that, the listener address. Absolute-form
/// request targets are used as sent.
pub(crate) fn absolute_url(origin: &RequestOrigin, host: Option<&str>, uri: &Uri) -> String {
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    if let Some(base) = origin.public_url.as_ref() {
        return format!("{}{path_and_query}", base.as_str().trim_end_matches('/'));
    }

    if uri.scheme().is_some() && uri.authority().is_some() {
        return uri.to_string();
    }

    if let Some(host) = host {
        return format!("http://{host}{path_and_query}");
    }

    match origin.listen_addr {
        Some(addr) => format!("http://{addr}{path_and_query}"),
        None => {
            warn!(
                target = "hotfeed::http::request",
                path = path_and_query,
                "no public url, host header or listen address; self link stays relative"
            );
            path_and_query.to_string()
        }
    }
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis();

    if status.is_client_error() || status.is_server_error() {
        let report = response.extensions_mut().remove::<ErrorReport>();
        let (source, messages) = match report {
            Some(report) => (report.source, report.messages),
            None => ("unknown", Vec::new()),
        };
        let detail = messages
            .first()
            .cloned()
            .unwrap_or_else(|| "no diagnostic available".to_string());

        if status.is_server_error() {
            error!(
                target = "hotfeed::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                "request failed",
            );
        } else {
            warn!(
                target = "hotfeed::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                "client request error",
            );
        }
    } else {
        let cache = response
            .headers()
            .get(CACHE_STATUS_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");
        info!(
            target = "hotfeed::http::response",
            status = status.as_u16(),
            method = %method,
            path = %uri.path(),
            elapsed_ms = elapsed_ms,
            cache = cache,
            request_id = request_id,
            "request served",
        );
    }

    response
}
