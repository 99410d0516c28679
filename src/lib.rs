//! Guide Scraper: follows a paginated article series and weaves it into one document
//!
//! This crate walks a chain of "next page" links, extracts structured content
//! from every page, downloads referenced images, aggregates the pages into a
//! single hierarchical document and renders it as markdown.

pub mod config;
pub mod crawler;
pub mod document;
pub mod extract;
pub mod images;
pub mod output;

use thiserror::Error;

/// Main error type for Guide Scraper operations
#[derive(Debug, Error)]
pub enum GuideError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid header override: {0}")]
    InvalidHeader(String),

    #[error("No start URL provided")]
    MissingStartUrl,
}

/// Page fetch failures, split by whether a retry may help
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Server error, connection drop or timeout
    #[error("transient failure fetching {url}: {reason}")]
    Transient { url: String, reason: String },

    /// Client error or anything else a retry will not change
    #[error("permanent failure fetching {url}: {reason}")]
    Permanent { url: String, reason: String },
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transient { .. })
    }

    pub fn url(&self) -> &str {
        match self {
            FetchError::Transient { url, .. } | FetchError::Permanent { url, .. } => url,
        }
    }
}

/// Image download failures
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Content item carries no image URL")]
    MissingUrl,

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("IO error writing {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for Guide Scraper operations
pub type Result<T> = std::result::Result<T, GuideError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run, Controller, CrawlControl};
pub use document::{Aggregator, Document};
pub use extract::{ContentItem, PageContent};
pub use output::{render, Summary};
