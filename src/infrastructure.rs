//! Infrastructure layer for configuration, logging, HTTP, parsing and file I/O
//!
//! Concrete implementations of the domain ports (`SiteAdapter`,
//! `PacingPolicy`) live here together with the ambient plumbing.

pub mod config;
pub mod http_client;
pub mod logging;
pub mod pacing;
pub mod parsing;
pub mod site_adapter;
pub mod spreadsheet;

pub use config::{AppConfig, ConfigManager, PacingStrategy};
pub use http_client::{HttpClient, HttpClientConfig};
pub use logging::{get_log_directory, init_logging_with_config};
pub use pacing::{FixedDelayPacing, PerSiteRateLimiter, build_pacing};
pub use parsing::{SiteProfile, TitleExtractor};
pub use site_adapter::HttpSiteAdapter;
pub use spreadsheet::{read_results, read_varieties, write_results};
