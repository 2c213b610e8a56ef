//! Supported marketplaces
//!
//! The set of sites is fixed at compile time. The declaration order of the
//! variants is the canonical "site order" used when a search task walks the
//! selected sites, so rows inside one variety's contribution are deterministic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::InputValidationError;

/// An auction or marketplace website that can be searched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Site {
    #[serde(rename = "eBay")]
    Ebay,
    #[serde(rename = "Heritage Auctions")]
    HeritageAuctions,
    #[serde(rename = "GreatCollections")]
    GreatCollections,
    #[serde(rename = "MA-Shops")]
    MaShops,
    #[serde(rename = "VCoins")]
    VCoins,
}

impl Site {
    /// Every supported site, in canonical order
    pub const ALL: [Site; 5] = [
        Site::Ebay,
        Site::HeritageAuctions,
        Site::GreatCollections,
        Site::MaShops,
        Site::VCoins,
    ];

    /// Human readable name, also used in the `Auction Site` output column
    pub fn display_name(self) -> &'static str {
        match self {
            Site::Ebay => "eBay",
            Site::HeritageAuctions => "Heritage Auctions",
            Site::GreatCollections => "GreatCollections",
            Site::MaShops => "MA-Shops",
            Site::VCoins => "VCoins",
        }
    }

    /// Short identifier accepted on the command line
    pub fn slug(self) -> &'static str {
        match self {
            Site::Ebay => "ebay",
            Site::HeritageAuctions => "heritage",
            Site::GreatCollections => "greatcollections",
            Site::MaShops => "ma-shops",
            Site::VCoins => "vcoins",
        }
    }

    /// Sites selected when the caller does not choose any explicitly
    pub fn default_selection() -> Vec<Site> {
        vec![Site::Ebay, Site::HeritageAuctions]
    }

    /// Put a caller supplied selection into canonical order and drop duplicates.
    pub fn normalize_selection(selection: &[Site]) -> Vec<Site> {
        let mut sites = selection.to_vec();
        sites.sort_unstable();
        sites.dedup();
        sites
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Site {
    type Err = InputValidationError;

    /// Accepts either the display name or the slug, ignoring case and
    /// surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Site::ALL
            .into_iter()
            .find(|site| {
                site.display_name().eq_ignore_ascii_case(wanted)
                    || site.slug().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| InputValidationError::UnknownSite(wanted.to_string()))
    }
}
