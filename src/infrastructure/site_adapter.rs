//! HTTP-backed site adapter

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

use crate::domain::{FetchError, MAX_TITLES_PER_SITE, Site, SiteAdapter};
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::parsing::{SiteProfile, TitleExtractor, profile};

/// Catalog entry with its selector already compiled
struct SiteEndpoint {
    profile: SiteProfile,
    extractor: TitleExtractor,
}

/// Queries the live marketplaces: one GET per call, titles scraped with the
/// selector from the site catalog.
pub struct HttpSiteAdapter {
    http_client: HttpClient,
    endpoints: HashMap<Site, SiteEndpoint>,
}

impl HttpSiteAdapter {
    pub fn new(http_client: HttpClient) -> Result<Self, FetchError> {
        Self::with_title_limit(http_client, MAX_TITLES_PER_SITE)
    }

    /// Built-in catalog with a custom title limit
    pub fn with_title_limit(http_client: HttpClient, limit: usize) -> Result<Self, FetchError> {
        Self::with_profiles(http_client, limit, Site::ALL.map(|site| profile(site).clone()))
    }

    /// Selectors are compiled once, up front. Sites without a profile fail
    /// every query with a request error.
    pub fn with_profiles<I>(http_client: HttpClient, limit: usize, profiles: I) -> Result<Self, FetchError>
    where
        I: IntoIterator<Item = SiteProfile>,
    {
        let endpoints = profiles
            .into_iter()
            .map(|profile| {
                let extractor = TitleExtractor::with_limit(&profile.title_selector, limit)?;
                Ok((profile.site, SiteEndpoint { profile, extractor }))
            })
            .collect::<Result<HashMap<_, _>, FetchError>>()?;

        Ok(Self {
            http_client,
            endpoints,
        })
    }

    fn endpoint(&self, site: Site) -> Result<&SiteEndpoint, FetchError> {
        self.endpoints
            .get(&site)
            .ok_or_else(|| FetchError::request(format!("no catalog entry for {site}"), ""))
    }
}

#[async_trait]
impl SiteAdapter for HttpSiteAdapter {
    async fn fetch_titles(&self, site: Site, query: &str) -> Result<Vec<String>, FetchError> {
        let endpoint = self.endpoint(site)?;
        let url = endpoint.profile.search_url(query);

        let html = self.http_client.get_text(&url).await?;
        let titles = endpoint.extractor.extract(&html);

        debug!("{} returned {} titles for '{}'", site, titles.len(), query);
        Ok(titles)
    }
}
