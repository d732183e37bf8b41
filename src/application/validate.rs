//! Structural checks between extraction and rendering.

use thiserror::Error;

use crate::domain::Record;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Found no elements!")]
    NoElementsFound,
    #[error("Failed to find a URL for '{0}'")]
    MissingUrl(String),
}

/// A non-empty batch in which every record has a url.
///
/// Only [`validate`] can build one, so the renderer never sees a record
/// without a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRecords {
    records: Vec<Record>,
}

impl ValidRecords {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records paired with their url, in extraction order.
    pub fn iter(&self) -> impl Iterator<Item = (&Record, &str)> {
        self.records
            .iter()
            .filter_map(|record| record.url.as_deref().map(|url| (record, url)))
    }

    pub fn into_inner(self) -> Vec<Record> {
        self.records
    }
}

/// Empty batch first, then the first record lacking a url; later records are
/// not examined once a failure is found.
pub fn validate(records: Vec<Record>) -> Result<ValidRecords, ValidationError> {
    if records.is_empty() {
        return Err(ValidationError::NoElementsFound);
    }

    if let Some(broken) = records.iter().find(|record| record.url.is_none()) {
        return Err(ValidationError::MissingUrl(broken.title.clone()));
    }

    Ok(ValidRecords { records })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linked(title: &str) -> Record {
        Record {
            url: Some(format!("/m/{title}")),
            ..Record::titled(title)
        }
    }

    #[test]
    fn empty_batch_is_rejected() {
        assert_eq!(validate(Vec::new()), Err(ValidationError::NoElementsFound));
    }

    #[test]
    fn first_missing_url_is_reported() {
        let records = vec![
            linked("a"),
            Record::titled("b"),
            Record::titled("c"),
        ];

        assert_eq!(
            validate(records),
            Err(ValidationError::MissingUrl("b".to_string()))
        );
    }

    #[test]
    fn valid_batch_passes_through_unchanged() {
        let records = vec![linked("a"), linked("b")];
        let valid = validate(records.clone()).expect("valid batch");

        assert_eq!(valid.len(), 2);
        let urls: Vec<&str> = valid.iter().map(|(_, url)| url).collect();
        assert_eq!(urls, vec!["/m/a", "/m/b"]);
        assert_eq!(valid.into_inner(), records);
    }

    #[test]
    fn messages_match_the_public_responses() {
        assert_eq!(ValidationError::NoElementsFound.to_string(), "Found no elements!");
        assert_eq!(
            ValidationError::MissingUrl("Dune".to_string()).to_string(),
            "Failed to find a URL for 'Dune'"
        );
    }
}
