//! Domain layer types and invariants.

pub mod error;
pub mod kind;
pub mod record;

pub use kind::FeedKind;
pub use record::{Record, TITLE_NOT_FOUND};
