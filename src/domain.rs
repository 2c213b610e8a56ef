//! Domain module - core types of a coin listing search
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod errors;
pub mod result_row;
pub mod services;
pub mod site;
pub mod variety;

pub use errors::{ExportError, FetchError, InputValidationError};
pub use result_row::{Listing, ResultRow, ResultTable};
pub use services::{MAX_TITLES_PER_SITE, PacingPolicy, SiteAdapter};
pub use site::Site;
pub use variety::Variety;
