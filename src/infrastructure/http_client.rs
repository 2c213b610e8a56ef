//! HTTP client for marketplace search pages
//!
//! One GET per call, no retries. Transport failures, non-success statuses and
//! empty bodies are reported as [`FetchError`] so the caller can turn them
//! into error rows.

use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, USER_AGENT},
};
use std::time::Duration;
use tracing::debug;

use crate::domain::FetchError;
use crate::infrastructure::config::HttpConfig;

/// HTTP client configuration
#[derive(Debug, Clone, serde::Serialize)]
pub struct HttpClientConfig {
    pub user_agent: String,
    /// Total request timeout; `None` disables it
    pub timeout: Option<Duration>,
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::from_http_config(&HttpConfig::default())
    }
}

impl HttpClientConfig {
    /// Create HttpClientConfig from the `http` config section
    pub fn from_http_config(http: &HttpConfig) -> Self {
        Self {
            user_agent: http.user_agent.clone(),
            timeout: (http.request_timeout_seconds > 0)
                .then(|| Duration::from_secs(http.request_timeout_seconds)),
            follow_redirects: http.follow_redirects,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| anyhow::anyhow!("Invalid user agent '{}': {}", config.user_agent, e))?,
        );

        let mut builder = Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            });
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { client, config })
    }

    /// Fetch URL and return the body text
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        debug!("🌐 HTTP GET: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(&e, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response.text().await.map_err(|e| self.classify(&e, url))?;
        if text.trim().is_empty() {
            return Err(FetchError::EmptyBody { url: url.to_string() });
        }

        debug!("Fetched {} ({} chars)", url, text.len());
        Ok(text)
    }

    fn classify(&self, error: &reqwest::Error, url: &str) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                after: self.config.timeout,
            }
        } else {
            FetchError::request(error.to_string(), url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(HttpClient::new(HttpClientConfig::default()).is_ok());
    }

    #[test]
    fn test_config_from_http_section() {
        let http = HttpConfig {
            request_timeout_seconds: 0,
            ..HttpConfig::default()
        };
        let config = HttpClientConfig::from_http_config(&http);
        assert!(config.timeout.is_none());
        assert_eq!(config.user_agent, "Mozilla/5.0");
    }

    #[test]
    fn test_invalid_user_agent_is_rejected() {
        let config = HttpClientConfig {
            user_agent: "bad\nagent".to_string(),
            ..HttpClientConfig::default()
        };
        assert!(HttpClient::new(config).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_request_error() {
        let client = HttpClient::new(HttpClientConfig {
            timeout: Some(Duration::from_secs(2)),
            ..HttpClientConfig::default()
        })
        .unwrap();
        let result = client.get_text("http://127.0.0.1:9/search").await;
        assert!(matches!(
            result,
            Err(FetchError::Request { .. } | FetchError::Timeout { .. })
        ));
    }
}
