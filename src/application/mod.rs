//! Scrape, validate and syndicate listing pages.

pub mod error;
pub mod extract;
pub mod feed;
pub mod syndication;
pub mod upstream;
pub mod validate;
