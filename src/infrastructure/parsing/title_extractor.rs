//! Listing title extraction
//!
//! Takes the first `limit` elements matching the site's title selector and
//! keeps the ones with non-blank text. A page with no matching elements is a
//! valid empty result, not an error.

use scraper::{Html, Selector};
use tracing::debug;

use crate::domain::{FetchError, MAX_TITLES_PER_SITE};

#[derive(Debug, Clone)]
pub struct TitleExtractor {
    selector: Selector,
    selector_source: String,
    limit: usize,
}

impl TitleExtractor {
    pub fn new(selector: &str) -> Result<Self, FetchError> {
        Self::with_limit(selector, MAX_TITLES_PER_SITE)
    }

    pub fn with_limit(selector: &str, limit: usize) -> Result<Self, FetchError> {
        let compiled =
            Selector::parse(selector).map_err(|e| FetchError::invalid_selector(selector, e.to_string()))?;
        Ok(Self {
            selector: compiled,
            selector_source: selector.to_string(),
            limit: limit.min(MAX_TITLES_PER_SITE),
        })
    }

    pub fn selector(&self) -> &str {
        &self.selector_source
    }

    /// Extract titles from a full HTML document
    pub fn extract(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let titles: Vec<String> = document
            .select(&self.selector)
            .take(self.limit)
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|title| !title.is_empty())
            .collect();

        debug!("Selector '{}' yielded {} titles", self.selector_source, titles.len());
        titles
    }
}
