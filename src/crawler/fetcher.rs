//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with a proper user agent string
//! - GET requests with an optional per-request timeout
//! - Error classification
//!
//! Failures are never retried. Callers log them and move on.

use crate::config::UserAgentConfig;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body read failure)
    NetworkError {
        /// Error description
        error: String,
        /// True when the request hit its timeout
        timed_out: bool,
    },
}

impl FetchResult {
    /// Short description of a failure, for log lines
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::HttpError { status_code } => {
                Some(format!("server responded with {}", status_code))
            }
            Self::NetworkError { timed_out: true, .. } => Some("timed out".to_string()),
            Self::NetworkError { error, .. } => Some(error.clone()),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// No overall timeout is set on the client; each request carries its own.
///
/// # Example
///
/// ```no_run
/// use registry_crawler::config::UserAgentConfig;
/// use registry_crawler::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "RegistryCrawler".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent(config))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Format: CrawlerName/Version (+ContactURL; ContactEmail)
pub fn user_agent(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Fetches a URL and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with readable body | `Success` |
/// | Any other status | `HttpError` |
/// | Timeout | `NetworkError { timed_out: true }` |
/// | Connection or body error | `NetworkError { timed_out: false }` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `timeout` - Request timeout; `None` leaves the request unbounded
pub async fn fetch_url(client: &Client, url: &Url, timeout: Option<Duration>) -> FetchResult {
    let mut request = client.get(url.clone());
    if let Some(timeout) = timeout {
        request = request.timeout(timeout);
    }

    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => return classify_error(e),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            status_code: status.as_u16(),
            body,
        },
        Err(e) => classify_error(e),
    }
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::NetworkError {
            error: "Request timeout".to_string(),
            timed_out: true,
        }
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: "Connection refused".to_string(),
            timed_out: false,
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
            timed_out: false,
        }
    }
}
