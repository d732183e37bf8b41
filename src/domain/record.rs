/// Placeholder title for a listing item whose title link could not be found.
pub const TITLE_NOT_FOUND: &str = "<TITLE_NOT_FOUND>";

/// One item scraped from a listing page.
///
/// Every field except `title` is optional. `url` is required for rendering,
/// but its absence is reported by validation rather than at extraction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub title: String,
    pub time_of_release: Option<String>,
    pub rating_score: Option<String>,
    pub preview_image_url: Option<String>,
    pub synopsis: Option<String>,
    pub starring_text: Option<String>,
    pub director_text: Option<String>,
    pub url: Option<String>,
}

impl Record {
    /// A record carrying only a title, the base for struct update syntax.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            time_of_release: None,
            rating_score: None,
            preview_image_url: None,
            synopsis: None,
            starring_text: None,
            director_text: None,
            url: None,
        }
    }
}
