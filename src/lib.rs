//! Coin Search - listing search for coin varieties across auction sites
//!
//! Takes a list of coin varieties and a selection of marketplaces, fetches the
//! first few listing titles per (variety, site) pair concurrently, and returns
//! them as one result table ready for export.
//!
//! ```no_run
//! use std::sync::Arc;
//! use coin_search_lib::application::{OrchestratorConfig, SearchOrchestrator};
//! use coin_search_lib::domain::{Site, Variety};
//! use coin_search_lib::infrastructure::{HttpClient, HttpClientConfig, HttpSiteAdapter, FixedDelayPacing};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let adapter = HttpSiteAdapter::new(HttpClient::new(HttpClientConfig::default())?)?;
//! let orchestrator = SearchOrchestrator::new(
//!     Arc::new(adapter),
//!     Arc::new(FixedDelayPacing::new(std::time::Duration::from_millis(1500))),
//!     OrchestratorConfig::default(),
//! );
//! let table = orchestrator
//!     .run(Variety::collect_valid(["1909-S VDB"]), &[Site::Ebay], |p| println!("{:.0}%", p.fraction() * 100.0))
//!     .await;
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{OrchestratorConfig, SearchOrchestrator, SearchProgress};
pub use domain::{ExportError, FetchError, InputValidationError, Listing, ResultRow, ResultTable, Site, Variety};
