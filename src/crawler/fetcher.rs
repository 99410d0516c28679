//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and header overrides
//! - Enforcing a minimum delay between consecutive page requests
//! - Retry logic for transient failures
//! - Error classification

use crate::config::HttpConfig;
use crate::{ConfigError, FetchError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};

/// Outcome of a single request attempt
#[derive(Debug)]
pub enum AttemptOutcome {
    /// Response body, decoded as UTF-8
    Success(String),

    /// Worth retrying: 5xx, connection failure, timeout
    Transient(String),

    /// Not worth retrying: 4xx and anything else
    Permanent(String),
}

/// Counters describing fetcher activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Requests issued, retries included
    pub attempts: u32,

    /// Sleeps taken between retry attempts
    pub retry_sleeps: u32,

    /// Sleeps taken to honor the inter-request delay
    pub rate_limit_sleeps: u32,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(ConfigError)` - A header override or the client itself was invalid
pub fn build_http_client(config: &HttpConfig) -> Result<Client, ConfigError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
    );

    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ConfigError::InvalidHeader(format!("invalid header name '{}'", name)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| ConfigError::InvalidHeader(format!("invalid value for header '{}'", name)))?;
        headers.insert(name, value);
    }

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(|e| ConfigError::Validation(format!("failed to build HTTP client: {}", e)))
}

/// Rate-limited page fetcher with retry
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 5xx | Retry up to `max_retries` times, `retry_delay` apart |
/// | Timeout | Retry up to `max_retries` times, `retry_delay` apart |
/// | Connection failure | Retry up to `max_retries` times, `retry_delay` apart |
/// | HTTP 4xx | Immediate → Permanent |
/// | Anything else | Immediate → Permanent |
pub struct Fetcher {
    client: Client,
    delay: Duration,
    max_retries: u32,
    retry_delay: Duration,
    last_request_end: Option<Instant>,
    stats: FetchStats,
}

impl Fetcher {
    /// Creates a fetcher from the HTTP configuration
    pub fn new(config: &HttpConfig) -> Result<Self, ConfigError> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, config: &HttpConfig) -> Self {
        Self {
            client,
            delay: Duration::from_millis(config.delay_ms),
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            last_request_end: None,
            stats: FetchStats::default(),
        }
    }

    pub fn stats(&self) -> FetchStats {
        self.stats
    }

    /// Fetches a page, retrying transient failures
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The page HTML
    /// * `Err(FetchError)` - The last failure once retries are exhausted, or the
    ///   first permanent failure
    pub async fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
        self.wait_for_slot().await;

        let mut retries = 0;
        let result = loop {
            self.stats.attempts += 1;
            match self.attempt(url).await {
                AttemptOutcome::Success(body) => break Ok(body),
                AttemptOutcome::Transient(reason) => {
                    if retries >= self.max_retries {
                        break Err(FetchError::Transient {
                            url: url.to_string(),
                            reason,
                        });
                    }
                    retries += 1;
                    tracing::warn!(
                        "Transient failure for {}: {} (retry {}/{})",
                        url,
                        reason,
                        retries,
                        self.max_retries
                    );
                    self.stats.retry_sleeps += 1;
                    tokio::time::sleep(self.retry_delay).await;
                }
                AttemptOutcome::Permanent(reason) => {
                    break Err(FetchError::Permanent {
                        url: url.to_string(),
                        reason,
                    });
                }
            }
        };

        self.last_request_end = Some(Instant::now());

        if let Err(e) = &result {
            tracing::warn!("{}", e);
        }

        result
    }

    /// Sleeps off whatever remains of the delay since the previous request ended
    async fn wait_for_slot(&mut self) {
        if let Some(last) = self.last_request_end {
            let remaining = self.delay.saturating_sub(last.elapsed());
            if !remaining.is_zero() {
                tracing::trace!("Rate limiting: sleeping {:?}", remaining);
                self.stats.rate_limit_sleeps += 1;
                tokio::time::sleep(remaining).await;
            }
        }
    }

    /// Issues one GET and classifies the result
    async fn attempt(&self, url: &str) -> AttemptOutcome {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return classify_error(&e),
        };

        let status = response.status();
        if let Some(outcome) = classify_status(status) {
            return outcome;
        }

        // Decode as UTF-8 whatever charset the server declares
        match response.bytes().await {
            Ok(bytes) => AttemptOutcome::Success(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => classify_error(&e),
        }
    }
}

/// Maps a non-success HTTP status to an outcome
fn classify_status(status: StatusCode) -> Option<AttemptOutcome> {
    if status.is_success() {
        None
    } else if status.is_server_error() {
        Some(AttemptOutcome::Transient(format!("HTTP {}", status.as_u16())))
    } else {
        Some(AttemptOutcome::Permanent(format!("HTTP {}", status.as_u16())))
    }
}

/// Maps a transport error to an outcome
fn classify_error(e: &reqwest::Error) -> AttemptOutcome {
    if e.is_timeout() {
        AttemptOutcome::Transient("Request timeout".to_string())
    } else if e.is_connect() {
        AttemptOutcome::Transient(format!("Connection failed: {}", e))
    } else {
        AttemptOutcome::Permanent(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> HttpConfig {
        HttpConfig {
            user_agent: "TestScraper/1.0".to_string(),
            delay_ms: 0,
            max_retries: 3,
            retry_delay_ms: 1,
            timeout_secs: 5,
            headers: Default::default(),
        }
    }

    #[test]
    fn test_build_http_client() {
        let config = create_test_config();
        assert!(build_http_client(&config).is_ok());
    }

    #[test]
    fn test_build_http_client_rejects_bad_header() {
        let mut config = create_test_config();
        config
            .headers
            .insert("X-Ok".to_string(), "bad\nvalue".to_string());
        assert!(matches!(
            build_http_client(&config),
            Err(ConfigError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_classify_status() {
        assert!(classify_status(StatusCode::OK).is_none());
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY),
            Some(AttemptOutcome::Transient(_))
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND),
            Some(AttemptOutcome::Permanent(_))
        ));
    }

    #[tokio::test]
    async fn test_connection_failure_is_retried() {
        let mut config = create_test_config();
        config.max_retries = 2;
        let mut fetcher = Fetcher::new(&config).unwrap();

        // Nothing listens on port 9 of localhost
        let result = fetcher.fetch("http://127.0.0.1:9/page.html").await;

        assert!(matches!(result, Err(FetchError::Transient { .. })));
        assert_eq!(fetcher.stats().attempts, 3);
        assert_eq!(fetcher.stats().retry_sleeps, 2);
    }

    #[tokio::test]
    async fn test_delay_measured_from_previous_request() {
        let mut config = create_test_config();
        config.max_retries = 0;
        config.delay_ms = 50;
        let mut fetcher = Fetcher::new(&config).unwrap();

        let _ = fetcher.fetch("http://127.0.0.1:9/a").await;
        assert_eq!(fetcher.stats().rate_limit_sleeps, 0);

        let started = Instant::now();
        let _ = fetcher.fetch("http://127.0.0.1:9/b").await;
        assert_eq!(fetcher.stats().rate_limit_sleeps, 1);
        assert!(started.elapsed() >= Duration::from_millis(40));
    }
}
