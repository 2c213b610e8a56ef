//! Domain service traits
//!
//! Ports implemented by the infrastructure layer and consumed by the
//! search orchestrator.

use async_trait::async_trait;

use super::errors::FetchError;
use super::site::Site;

/// Maximum number of titles kept per (variety, site) query
pub const MAX_TITLES_PER_SITE: usize = 5;

/// Turns a query into listing titles for one marketplace.
///
/// Implementations issue exactly one outbound request per call, return at most
/// [`MAX_TITLES_PER_SITE`] non-empty titles in page order, and hold no state
/// that the orchestrator depends on.
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    async fn fetch_titles(&self, site: Site, query: &str) -> Result<Vec<String>, FetchError>;
}

/// Minimum-gap policy applied around every adapter invocation.
///
/// Shared by all concurrent search tasks, so implementations must be safe to
/// call from several workers at once.
#[async_trait]
pub trait PacingPolicy: Send + Sync {
    /// Called before the adapter is invoked for `site`
    async fn before_request(&self, _site: Site) {}

    /// Called after the adapter returned for `site`, whether it succeeded or not
    async fn after_request(&self, _site: Site) {}
}
