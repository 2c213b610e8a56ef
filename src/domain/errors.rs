//! Typed error kinds for a search run
//!
//! `FetchError` is recovered per (variety, site) cell and becomes an error row.
//! `InputValidationError` and `ExportError` are terminal for the caller.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single site query for a single variety
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request did not finish within the configured timeout
    #[error("timeout")]
    Timeout { after: Option<Duration> },

    #[error("request failed: {message}")]
    Request { message: String, url: String },

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("empty response from {url}")]
    EmptyBody { url: String },

    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// The search task ended without reporting a result for this cell
    #[error("search task aborted: {reason}")]
    TaskAborted { reason: String },
}

impl FetchError {
    pub fn timeout(after: Duration) -> Self {
        Self::Timeout { after: Some(after) }
    }

    pub fn request(message: impl Into<String>, url: &str) -> Self {
        Self::Request {
            message: message.into(),
            url: url.to_string(),
        }
    }

    pub fn invalid_selector(selector: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether a later run could plausibly succeed for the same cell.
    /// Picks the log level of a failed cell; cells are never retried in a run.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Request { .. } | Self::EmptyBody { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidSelector { .. } | Self::TaskAborted { .. } => false,
        }
    }
}

/// Problems with the caller's input, reported before any network activity
#[derive(Error, Debug)]
pub enum InputValidationError {
    #[error("the file must contain a column named '{column}' (found: {found:?})")]
    MissingColumn { column: String, found: Vec<String> },

    #[error("failed to read {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    #[error("unknown auction site '{0}'")]
    UnknownSite(String),

    #[error("malformed row {row}: {reason}")]
    MalformedRow { row: u64, reason: String },
}

impl InputValidationError {
    pub fn missing_column(column: &str, found: Vec<String>) -> Self {
        Self::MissingColumn {
            column: column.to_string(),
            found,
        }
    }

    pub fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Unreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Failure while producing the output table
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write results to {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("failed to encode results: {0}")]
    Encode(String),
}

impl ExportError {
    pub fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Write {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_renders_plainly() {
        assert_eq!(FetchError::timeout(Duration::from_secs(20)).to_string(), "timeout");
    }

    #[test]
    fn test_transient_classification() {
        assert!(FetchError::request("connection reset", "https://example.com").is_transient());
        assert!(
            FetchError::Status {
                status: 503,
                url: "https://example.com".into()
            }
            .is_transient()
        );
        assert!(
            !FetchError::Status {
                status: 404,
                url: "https://example.com".into()
            }
            .is_transient()
        );
        assert!(!FetchError::invalid_selector("..", "bad").is_transient());
    }

    #[test]
    fn test_missing_column_message() {
        let err = InputValidationError::missing_column("Variety", vec!["Name".into()]);
        assert!(err.to_string().contains("'Variety'"));
    }
}
