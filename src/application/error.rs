use std::borrow::Cow;
use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{application::feed::FeedError, domain::error::DomainError, infra::error::InfraError};

const FEED_ERROR_SOURCE: &str = "infra::http::feed_error_to_http_error";

#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: Cow<'static, str>,
    report: ErrorReport,
}

impl HttpError {
    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: impl Into<Cow<'static, str>>,
        error: &dyn StdError,
    ) -> Self {
        let report = ErrorReport::from_error(source, status, error);
        Self {
            status,
            public_message: public_message.into(),
            report,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn public_message(&self) -> &str {
        &self.public_message
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message.into_owned()).into_response();
        self.report.attach(&mut response);
        response
    }
}

impl From<FeedError> for HttpError {
    fn from(error: FeedError) -> Self {
        match error {
            FeedError::Validation(err) => HttpError::from_error(
                FEED_ERROR_SOURCE,
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
                &err,
            ),
            FeedError::Upstream(err) if err.is_timeout() => HttpError::from_error(
                FEED_ERROR_SOURCE,
                StatusCode::GATEWAY_TIMEOUT,
                "Upstream timed out",
                &err,
            ),
            FeedError::Upstream(err) => HttpError::from_error(
                FEED_ERROR_SOURCE,
                StatusCode::BAD_GATEWAY,
                "Upstream unavailable",
                &err,
            ),
            FeedError::Extract(err) => HttpError::from_error(
                FEED_ERROR_SOURCE,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                &err,
            ),
        }
    }
}

impl From<DomainError> for HttpError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::UnknownFeed { .. } => HttpError::from_error(
                "infra::http::domain_error_to_http_error",
                StatusCode::NOT_FOUND,
                "Not found!",
                &error,
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::upstream::UpstreamError;
    use crate::application::validate::ValidationError;

    #[test]
    fn validation_failures_expose_their_message() {
        let error = HttpError::from(FeedError::from(ValidationError::MissingUrl(
            "Dune".to_string(),
        )));

        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.public_message(), "Failed to find a URL for 'Dune'");
    }

    #[test]
    fn upstream_timeouts_become_gateway_timeouts() {
        let error = HttpError::from(FeedError::from(UpstreamError::Timeout {
            url: "https://example.test".to_string(),
        }));

        assert_eq!(error.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(error.public_message(), "Upstream timed out");
    }

    #[test]
    fn other_upstream_failures_become_bad_gateway() {
        let error = HttpError::from(FeedError::from(UpstreamError::Status {
            url: "https://example.test".to_string(),
            status: 503,
        }));

        assert_eq!(error.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(error.public_message(), "Upstream unavailable");
    }

    #[test]
    fn unknown_feeds_are_not_found() {
        let error = HttpError::from(DomainError::unknown_feed("/other"));

        assert_eq!(error.status(), StatusCode::NOT_FOUND);
        assert_eq!(error.public_message(), "Not found!");
    }

    #[test]
    fn report_is_attached_to_the_response() {
        let response = HttpError::from(DomainError::unknown_feed("/other")).into_response();
        let report = response.extensions().get::<ErrorReport>().unwrap();

        assert_eq!(report.status, StatusCode::NOT_FOUND);
        assert_eq!(report.messages, vec!["no feed is published at `/other`"]);
    }
}
