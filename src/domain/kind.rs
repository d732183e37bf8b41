//! The two listings published by the service.

use std::fmt;
use std::str::FromStr;

use super::error::DomainError;

/// Which upstream listing a feed is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    Movies,
    Shows,
}

impl FeedKind {
    pub const ALL: [FeedKind; 2] = [FeedKind::Movies, FeedKind::Shows];

    /// Human-readable label used in the channel title and id.
    pub fn label(self) -> &'static str {
        match self {
            FeedKind::Movies => "Movies",
            FeedKind::Shows => "Shows",
        }
    }

    /// Path segment the feed is served under.
    pub fn slug(self) -> &'static str {
        match self {
            FeedKind::Movies => "movies",
            FeedKind::Shows => "shows",
        }
    }

    /// Resolve a request path such as `/movies` to a feed.
    ///
    /// Only exact matches are accepted; trailing slashes and nested paths are
    /// unknown, mirroring a plain `switch` on the pathname.
    pub fn from_path(path: &str) -> Result<Self, DomainError> {
        path.strip_prefix('/')
            .and_then(|segment| segment.parse().ok())
            .ok_or_else(|| DomainError::unknown_feed(path))
    }
}

impl FromStr for FeedKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        FeedKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == value)
            .ok_or_else(|| DomainError::unknown_feed(value))
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
