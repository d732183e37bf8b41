//! RSS rendering for scraped listings.
//!
//! Turns a validated batch into an RSS 2.0 document, keeping extraction order
//! as item order. Serialization itself is delegated to the `rss` crate.

use std::collections::BTreeMap;

use rss::extension::dublincore::{self, DublinCoreExtension};
use rss::{Channel, Enclosure, Guid, Item};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc2822;
use url::Url;

use crate::application::validate::ValidRecords;
use crate::domain::{FeedKind, Record};

const GENERATOR: &str = concat!("hotfeed ", env!("CARGO_PKG_VERSION"));
const DESCRIPTION_SEPARATOR: &str = "<br/>";
const FALLBACK_IMAGE_MIME: &str = "image/jpeg";

/// Feed-level settings shared by every render.
#[derive(Debug, Clone)]
pub struct SyndicationConfig {
    /// Name of the scraped site, e.g. `RottenTomatoes`.
    pub source_name: String,
    /// Stamp items with the fetch time instead of the Unix epoch.
    pub stamp_fetch_time: bool,
    /// Advertised channel `ttl`, in minutes.
    pub ttl_minutes: Option<u64>,
}

/// Per-request context: which feed, where it came from, where it lives.
#[derive(Debug, Clone)]
pub struct FeedRequest {
    pub kind: FeedKind,
    pub upstream_url: Url,
    pub self_link: String,
    pub fetched_at: OffsetDateTime,
}

/// A serialized feed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFeed {
    pub body: String,
    pub entries: usize,
}

#[derive(Debug, Clone)]
pub struct SyndicationService {
    config: SyndicationConfig,
}

impl SyndicationService {
    pub fn new(config: SyndicationConfig) -> Self {
        Self { config }
    }

    /// Render an RSS 2.0 channel with one item per record.
    pub fn rss_feed(&self, records: &ValidRecords, request: &FeedRequest) -> RenderedFeed {
        let published = if self.config.stamp_fetch_time {
            request.fetched_at
        } else {
            OffsetDateTime::UNIX_EPOCH
        };
        let pub_date = rfc2822(published);

        let items: Vec<Item> = records
            .iter()
            .map(|(record, url)| entry(record, url, &pub_date))
            .collect();
        let entries = items.len();

        let source = &self.config.source_name;
        let mut channel = Channel::default();
        channel.set_title(format!("Hot on {source}: {}", request.kind.label()));
        channel.set_link(request.self_link.clone());
        channel.set_description(format!("RSS version of {}", request.upstream_url));
        channel.set_copyright(format!("Same as {source}"));
        channel.set_last_build_date(rfc2822(request.fetched_at));
        channel.set_generator(GENERATOR.to_string());
        channel.set_ttl(self.config.ttl_minutes.map(|ttl| ttl.to_string()));
        channel.set_namespaces(BTreeMap::from([(
            "dc".to_string(),
            dublincore::NAMESPACE.to_string(),
        )]));
        channel.set_dublin_core_ext(identifier(feed_id(source, request.kind)));
        channel.set_items(items);

        RenderedFeed {
            body: channel.to_string(),
            entries,
        }
    }
}

fn rfc2822(at: OffsetDateTime) -> String {
    at.format(&Rfc2822).unwrap_or_else(|_| at.to_string())
}

/// Stable channel id, e.g. `hot-rottentomatoes-Movies`.
pub fn feed_id(source_name: &str, kind: FeedKind) -> String {
    format!("hot-{}-{}", source_name.to_lowercase(), kind.label())
}

fn identifier(id: String) -> DublinCoreExtension {
    let mut dublin_core = DublinCoreExtension::default();
    dublin_core.set_identifiers(vec![id]);
    dublin_core
}

fn entry(record: &Record, url: &str, pub_date: &str) -> Item {
    let mut guid = Guid::default();
    guid.set_value(url.to_string());
    guid.set_permalink(Url::parse(url).is_ok());

    let mut item = Item::default();
    item.set_title(entry_title(record));
    item.set_link(url.to_string());
    item.set_guid(guid);
    item.set_description(entry_description(record));
    item.set_pub_date(pub_date.to_string());
    item.set_enclosure(record.preview_image_url.as_deref().map(image_enclosure));
    item
}

/// `"<title> (<release>, <score>)"`; absent values render empty.
pub fn entry_title(record: &Record) -> String {
    format!(
        "{} ({}, {})",
        record.title,
        or_empty(&record.time_of_release),
        or_empty(&record.rating_score)
    )
}

/// Synopsis, cast and director joined by line breaks.
pub fn entry_description(record: &Record) -> String {
    [
        or_empty(&record.synopsis),
        or_empty(&record.starring_text),
        or_empty(&record.director_text),
    ]
    .join(DESCRIPTION_SEPARATOR)
}

fn or_empty(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

fn image_enclosure(src: &str) -> Enclosure {
    let path = Url::parse(src)
        .map(|parsed| parsed.path().to_string())
        .unwrap_or_else(|_| src.split(['?', '#']).next().unwrap_or(src).to_string());
    let mime = mime_guess::from_path(path)
        .first_raw()
        .filter(|mime| mime.starts_with("image/"))
        .unwrap_or(FALLBACK_IMAGE_MIME);

    let mut enclosure = Enclosure::default();
    enclosure.set_url(src.to_string());
    enclosure.set_length("0".to_string());
    enclosure.set_mime_type(mime.to_string());
    enclosure
}
