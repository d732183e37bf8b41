//! Scrapes listing items out of an upstream guide page.
//!
//! The page layout is fixed: every item lives in a countdown row inside the
//! article body, and each field is looked up with its own sub-selector. A
//! missing field never aborts the batch; it simply comes back as `None`.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::domain::{Record, TITLE_NOT_FOUND};

const CONTAINER: &str = "div.articleContentBody div.row.countdown-item";
const TITLE_LINK: &str = ".article_movie_title a";
const START_YEAR: &str = ".start-year";
const SCORE: &str = ".tMeterScore";
const POSTER: &str = "img.article_poster";
const SYNOPSIS: &str = "div.synopsis";
const CAST: &str = "div.cast";
const DIRECTOR: &str = "div.director";

static SELECTORS: Lazy<Result<ListingSelectors, ExtractError>> =
    Lazy::new(ListingSelectors::compile);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("selector `{selector}` is invalid: {reason}")]
    InvalidSelector {
        selector: &'static str,
        reason: String,
    },
}

/// Compiled container selector plus one sub-selector per field.
#[derive(Debug)]
struct ListingSelectors {
    container: Selector,
    title_link: Selector,
    start_year: Selector,
    score: Selector,
    poster: Selector,
    synopsis: Selector,
    cast: Selector,
    director: Selector,
}

impl ListingSelectors {
    fn compile() -> Result<Self, ExtractError> {
        Ok(Self {
            container: parse(CONTAINER)?,
            title_link: parse(TITLE_LINK)?,
            start_year: parse(START_YEAR)?,
            score: parse(SCORE)?,
            poster: parse(POSTER)?,
            synopsis: parse(SYNOPSIS)?,
            cast: parse(CAST)?,
            director: parse(DIRECTOR)?,
        })
    }

    /// The process-wide selector set, compiled on first use.
    fn shared() -> Result<&'static Self, ExtractError> {
        SELECTORS.as_ref().map_err(Clone::clone)
    }
}

fn parse(selector: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|err| ExtractError::InvalidSelector {
        selector,
        reason: err.to_string(),
    })
}

/// Parse `html` and extract one record per listing item, in document order.
pub fn extract_records(html: &str) -> Result<Vec<Record>, ExtractError> {
    let selectors = ListingSelectors::shared()?;
    let document = Html::parse_document(html);
    Ok(extract_from_document(&document, selectors))
}

fn extract_from_document(document: &Html, selectors: &ListingSelectors) -> Vec<Record> {
    document
        .select(&selectors.container)
        .map(|container| extract_record(container, selectors))
        .collect()
}

fn extract_record(container: ElementRef<'_>, selectors: &ListingSelectors) -> Record {
    let title_link = first(container, &selectors.title_link);

    let title = title_link
        .map(text_content)
        .unwrap_or_else(|| TITLE_NOT_FOUND.to_string());

    Record {
        time_of_release: first(container, &selectors.start_year)
            .map(text_content)
            .map(|year| strip_parentheses(&year).to_string()),
        rating_score: first(container, &selectors.score).map(text_content),
        preview_image_url: first(container, &selectors.poster).and_then(|img| attr(img, "src")),
        synopsis: trimmed_text(container, &selectors.synopsis),
        starring_text: trimmed_text(container, &selectors.cast),
        director_text: trimmed_text(container, &selectors.director),
        url: title_link.and_then(|link| attr(link, "href")),
        ..Record::titled(title)
    }
}

fn first<'a>(container: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    container.select(selector).next()
}

/// Concatenated text of every descendant text node, like DOM `textContent`.
fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect()
}

fn trimmed_text(container: ElementRef<'_>, selector: &Selector) -> Option<String> {
    first(container, selector).map(|node| text_content(node).trim().to_string())
}

fn attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element.value().attr(name).map(str::to_string)
}

/// Remove one enclosing `(`…`)` pair; anything unbalanced is returned as-is.
pub fn strip_parentheses(value: &str) -> &str {
    value
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn page(items: &str) -> String {
        format!(
            r#"<html><body>
            <div class="articleContentBody">{items}</div>
            <div class="row countdown-item">
              <div class="article_movie_title"><a href="/m/outside">Outside the article</a></div>
            </div>
            </body></html>"#
        )
    }

    const DUNE: &str = r#"
      <div class="row countdown-item">
        <img class="article_poster" src="https://img.example/dune.jpg">
        <div class="article_movie_title">
          <h2><a href="/m/dune">Dune</a> <span class="start-year">(2024)</span></h2>
          <span class="tMeterScore">92%</span>
        </div>
        <div class="synopsis">
          <strong>Synopsis:</strong> Paul goes to Arrakis.
        </div>
        <div class="cast">
          <strong>Starring:</strong> <a>Timothée Chalamet</a>, <a>Zendaya</a>
        </div>
        <div class="director"> <strong>Directed By:</strong> <a>Denis Villeneuve</a> </div>
      </div>"#;

    #[test]
    fn extracts_every_field() {
        let records = extract_records(&page(DUNE)).expect("selectors compile");

        assert_eq!(
            records,
            vec![Record {
                title: "Dune".to_string(),
                time_of_release: Some("2024".to_string()),
                rating_score: Some("92%".to_string()),
                preview_image_url: Some("https://img.example/dune.jpg".to_string()),
                synopsis: Some("Synopsis: Paul goes to Arrakis.".to_string()),
                starring_text: Some("Starring: Timothée Chalamet, Zendaya".to_string()),
                director_text: Some("Directed By: Denis Villeneuve".to_string()),
                url: Some("/m/dune".to_string()),
            }]
        );
    }

    #[test]
    fn keeps_document_order() {
        let items = ["First", "Second", "Third"]
            .iter()
            .map(|title| {
                format!(
                    r#"<div class="row countdown-item">
                      <div class="article_movie_title"><a href="/m/{title}">{title}</a></div>
                    </div>"#
                )
            })
            .collect::<String>();

        let titles: Vec<String> = extract_records(&page(&items))
            .expect("selectors compile")
            .into_iter()
            .map(|record| record.title)
            .collect();

        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn missing_fields_are_none() {
        let records =
            extract_records(&page(r#"<div class="row countdown-item"></div>"#)).unwrap();

        assert_eq!(records, vec![Record::titled(TITLE_NOT_FOUND)]);
    }

    #[test]
    fn score_is_kept_verbatim() {
        let item = r#"<div class="row countdown-item">
            <span class="tMeterScore"> 87% </span>
          </div>"#;

        let records = extract_records(&page(item)).unwrap();
        assert_eq!(records[0].rating_score.as_deref(), Some(" 87% "));
    }

    #[test]
    fn link_without_href_has_title_but_no_url() {
        let item = r#"<div class="row countdown-item">
            <div class="article_movie_title"><a>Nameless</a></div>
          </div>"#;

        let records = extract_records(&page(item)).unwrap();
        assert_eq!(records[0].title, "Nameless");
        assert_eq!(records[0].url, None);
    }

    #[test]
    fn page_without_containers_yields_nothing() {
        let records = extract_records("<html><body><p>maintenance</p></body></html>").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn strips_one_balanced_pair() {
        assert_eq!(strip_parentheses("(2024)"), "2024");
        assert_eq!(strip_parentheses("2024"), "2024");
        assert_eq!(strip_parentheses("(2024"), "(2024");
        assert_eq!(strip_parentheses("2024)"), "2024)");
        assert_eq!(strip_parentheses("((2024))"), "(2024)");
        assert_eq!(strip_parentheses("()"), "");
        assert_eq!(strip_parentheses("("), "(");
    }

    #[test]
    fn stripping_is_stable_on_plain_values() {
        let once = strip_parentheses("(2024)");
        assert_eq!(strip_parentheses(once), once);
    }

    #[test]
    fn shared_selectors_compile() {
        assert!(ListingSelectors::shared().is_ok());
    }
}
