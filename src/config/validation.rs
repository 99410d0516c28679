use crate::config::types::{Config, CrawlConfig, HttpConfig, OutputConfig};
use crate::ConfigError;
use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the crawl section; the start URL itself is optional at load time
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if let Some(start_url) = &config.start_url {
        validate_start_url(start_url)?;
    }

    if config.start_page < 1 {
        return Err(ConfigError::Validation(format!(
            "start_page must be >= 1, got {}",
            config.start_page
        )));
    }

    Ok(())
}

/// Parses a start URL and checks it is http(s)
pub fn validate_start_url(start_url: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start_url '{}': {}", start_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "start_url '{}' must use http or https",
            start_url
        )));
    }

    Ok(url)
}

/// Validates HTTP configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be > 0".to_string(),
        ));
    }

    for (name, value) in &config.headers {
        HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ConfigError::InvalidHeader(format!("invalid header name '{}'", name)))?;
        HeaderValue::from_str(value).map_err(|_| {
            ConfigError::InvalidHeader(format!("invalid value for header '{}'", name))
        })?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.file.is_empty() {
        return Err(ConfigError::Validation(
            "output file cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_start_url() {
        assert!(validate_start_url("https://example.com/guide/1.html").is_ok());
        assert!(validate_start_url("http://example.com/").is_ok());

        assert!(matches!(
            validate_start_url("ftp://example.com/"),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_start_url("not a url"),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_rejects_bad_http_settings() {
        let mut config = Config::default();
        config.http.max_retries = 50;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));

        let mut config = Config::default();
        config.http.timeout_secs = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.http.user_agent = "  ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_bad_header() {
        let mut config = Config::default();
        config
            .http
            .headers
            .insert("bad header".to_string(), "x".to_string());
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidHeader(_))
        ));
    }
}
