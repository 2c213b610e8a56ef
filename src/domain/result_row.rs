//! Result rows and the aggregated result table

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::FetchError;
use super::site::Site;
use super::variety::Variety;

/// Prefix used when an error listing is flattened to text
pub const ERROR_PREFIX: &str = "Error: ";

/// Content of the `Listing` column: a title or a failure description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Listing {
    Title(String),
    Error(String),
}

impl Listing {
    pub fn from_error(error: &FetchError) -> Self {
        Listing::Error(error.to_string())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Listing::Error(_))
    }

    /// Inverse of the `Display` rendering. A title that itself starts with
    /// `Error: ` cannot be told apart from an error and is read back as one.
    pub fn from_rendered(text: &str) -> Self {
        match text.strip_prefix(ERROR_PREFIX) {
            Some(description) => Listing::Error(description.to_string()),
            None => Listing::Title(text.to_string()),
        }
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Listing::Title(title) => f.write_str(title),
            Listing::Error(description) => write!(f, "{ERROR_PREFIX}{description}"),
        }
    }
}

/// One `(Variety, Site, Listing)` output record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub variety: Variety,
    pub site: Site,
    pub listing: Listing,
}

impl ResultRow {
    pub fn title(variety: Variety, site: Site, title: impl Into<String>) -> Self {
        Self {
            variety,
            site,
            listing: Listing::Title(title.into()),
        }
    }

    pub fn error(variety: Variety, site: Site, error: &FetchError) -> Self {
        Self {
            variety,
            site,
            listing: Listing::from_error(error),
        }
    }

    /// The three output columns as text
    pub fn to_record(&self) -> [String; 3] {
        [
            self.variety.to_string(),
            self.site.display_name().to_string(),
            self.listing.to_string(),
        ]
    }
}

/// Ordered rows of a completed search.
///
/// Rows of one variety appear contiguously in site order. Across varieties
/// the order is task completion order, not input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub const COLUMNS: [&'static str; 3] = ["Variety", "Auction Site", "Listing"];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<ResultRow>) -> Self {
        Self { rows }
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = ResultRow>) {
        self.rows.extend(rows);
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.rows.iter().filter(|row| row.listing.is_error()).count()
    }

    /// Rows contributed for one variety, in table order
    pub fn rows_for<'a>(&'a self, variety: &'a str) -> impl Iterator<Item = &'a ResultRow> + 'a {
        self.rows.iter().filter(move |row| row.variety.as_str() == variety)
    }
}

impl IntoIterator for ResultTable {
    type Item = ResultRow;
    type IntoIter = std::vec::IntoIter<ResultRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variety(name: &str) -> Variety {
        Variety::parse(name).unwrap()
    }

    #[test]
    fn test_listing_rendering() {
        assert_eq!(Listing::Title("2021 D Lincoln Cent".into()).to_string(), "2021 D Lincoln Cent");
        assert_eq!(Listing::Error("timeout".into()).to_string(), "Error: timeout");
    }

    #[test]
    fn test_listing_from_rendered() {
        assert_eq!(Listing::from_rendered("Error: timeout"), Listing::Error("timeout".into()));
        assert_eq!(Listing::from_rendered("Errors happen"), Listing::Title("Errors happen".into()));
    }

    #[test]
    fn test_error_row_uses_fetch_error_text() {
        let row = ResultRow::error(variety("1955 DDO"), Site::Ebay, &FetchError::Timeout { after: None });
        assert_eq!(
            row.to_record(),
            ["1955 DDO".to_string(), "eBay".to_string(), "Error: timeout".to_string()]
        );
    }

    #[test]
    fn test_table_queries() {
        let mut table = ResultTable::new();
        table.extend([
            ResultRow::title(variety("A"), Site::Ebay, "a1"),
            ResultRow::error(variety("B"), Site::Ebay, &FetchError::Timeout { after: None }),
            ResultRow::title(variety("A"), Site::VCoins, "a2"),
        ]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.error_count(), 1);
        assert_eq!(table.rows_for("A").count(), 2);
    }
}
