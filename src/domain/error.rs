use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("no feed is published at `{path}`")]
    UnknownFeed { path: String },
}

impl DomainError {
    pub fn unknown_feed(path: impl Into<String>) -> Self {
        Self::UnknownFeed { path: path.into() }
    }
}
