//! Site catalog
//!
//! Static table of search URL and title selector per marketplace.

use std::borrow::Cow;
use url::form_urlencoded;

use crate::domain::Site;

/// Search endpoint and title markup of one marketplace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteProfile {
    pub site: Site,
    /// Search URL up to and including the query parameter name
    pub search_url_prefix: Cow<'static, str>,
    /// CSS selector of the elements holding listing titles
    pub title_selector: Cow<'static, str>,
}

impl SiteProfile {
    /// Profile outside the built-in catalog, e.g. a mirror or a local test server
    pub fn new(
        site: Site,
        search_url_prefix: impl Into<Cow<'static, str>>,
        title_selector: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            site,
            search_url_prefix: search_url_prefix.into(),
            title_selector: title_selector.into(),
        }
    }

    /// Build the search URL; the query is form-encoded so spaces become `+`.
    pub fn search_url(&self, query: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
        format!("{}{}", self.search_url_prefix, encoded)
    }
}

static PROFILES: [SiteProfile; 5] = [
    SiteProfile {
        site: Site::Ebay,
        search_url_prefix: Cow::Borrowed("https://www.ebay.com/sch/i.html?_nkw="),
        title_selector: Cow::Borrowed(".s-item__title"),
    },
    SiteProfile {
        site: Site::HeritageAuctions,
        search_url_prefix: Cow::Borrowed("https://coins.ha.com/c/search-results.zx?N=792+231+51+1055+4294942355&Ntk=SI_Titles-Desc&Nty=1&Ntt="),
        title_selector: Cow::Borrowed(".item-title"),
    },
    SiteProfile {
        site: Site::GreatCollections,
        search_url_prefix: Cow::Borrowed("https://www.greatcollections.com/search.php?search="),
        title_selector: Cow::Borrowed(".item_title"),
    },
    SiteProfile {
        site: Site::MaShops,
        search_url_prefix: Cow::Borrowed("https://www.ma-shops.com/search.php?searchstr="),
        title_selector: Cow::Borrowed(".title"),
    },
    SiteProfile {
        site: Site::VCoins,
        search_url_prefix: Cow::Borrowed("https://www.vcoins.com/en/Search.aspx?search="),
        title_selector: Cow::Borrowed(".item-title"),
    },
];

/// Profile lookup for every supported site
pub fn profile(site: Site) -> &'static SiteProfile {
    match site {
        Site::Ebay => &PROFILES[0],
        Site::HeritageAuctions => &PROFILES[1],
        Site::GreatCollections => &PROFILES[2],
        Site::MaShops => &PROFILES[3],
        Site::VCoins => &PROFILES[4],
    }
}

pub fn all_profiles() -> &'static [SiteProfile] {
    &PROFILES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_site_has_its_own_profile() {
        for site in Site::ALL {
            assert_eq!(profile(site).site, site);
        }
        assert_eq!(all_profiles().len(), Site::ALL.len());
    }

    #[test]
    fn test_search_url_plus_encodes_spaces() {
        let url = profile(Site::Ebay).search_url("1909-S VDB");
        assert_eq!(url, "https://www.ebay.com/sch/i.html?_nkw=1909-S+VDB");
    }

    #[test]
    fn test_search_url_escapes_reserved_characters() {
        let url = profile(Site::VCoins).search_url("1/2 cent & more");
        assert_eq!(url, "https://www.vcoins.com/en/Search.aspx?search=1%2F2+cent+%26+more");
    }

    #[test]
    fn test_heritage_keeps_fixed_filters() {
        let url = profile(Site::HeritageAuctions).search_url("1955 DDO");
        assert!(url.starts_with("https://coins.ha.com/c/search-results.zx?N=792+231+51+1055+4294942355"));
        assert!(url.ends_with("&Ntt=1955+DDO"));
    }
}
