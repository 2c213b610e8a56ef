//! HTML parsing for marketplace search pages
//!
//! Selector configuration per site and the title extractor that applies it.

pub mod config;
pub mod title_extractor;

pub use config::{SiteProfile, all_profiles, profile};
pub use title_extractor::TitleExtractor;
