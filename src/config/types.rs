use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Main configuration structure for Guide Scraper
///
/// Every section falls back to its defaults, so an empty file is a valid
/// configuration (the start URL can be supplied on the command line).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub crawl: CrawlConfig,
    pub http: HttpConfig,
    pub images: ImageConfig,
    pub output: OutputConfig,
}

/// Page-chain traversal behavior
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// First page of the series
    #[serde(rename = "start-url", skip_serializing_if = "Option::is_none")]
    pub start_url: Option<String>,

    /// Stop after this many successfully processed pages (0 = no limit)
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Page number assigned to the start URL
    #[serde(rename = "start-page")]
    pub start_page: u32,

    /// Keep following links after a page fails
    #[serde(rename = "continue-on-error")]
    pub continue_on_error: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            start_url: None,
            max_pages: 0,
            start_page: 1,
            continue_on_error: true,
        }
    }
}

/// Page fetcher configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Minimum time between the end of one page request and the next (milliseconds)
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,

    /// Retries after the initial attempt for transient failures
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Pause between retry attempts (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Extra request headers, overriding the defaults
    pub headers: BTreeMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "GameGuideScraper/1.0".to_string(),
            delay_ms: 1000,
            max_retries: 3,
            retry_delay_ms: 2000,
            timeout_secs: 30,
            headers: BTreeMap::new(),
        }
    }
}

/// Image materializer configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ImageConfig {
    pub download: bool,

    /// Image directory; defaults to `<output dir>/images`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,

    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,

    #[serde(rename = "skip-existing")]
    pub skip_existing: bool,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            download: true,
            dir: None,
            delay_ms: 500,
            skip_existing: true,
        }
    }
}

/// How aggregated pages are grouped into chapters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// One chapter holding every page, TOC entries per page title
    #[default]
    Flat,
    /// Chapters and sections inferred from page titles
    Chapters,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: String,

    pub file: String,

    pub layout: Layout,

    /// Append-only log file mirroring the console log
    #[serde(rename = "log-file", skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "output".to_string(),
            file: "guide.md".to_string(),
            layout: Layout::Flat,
            log_file: None,
        }
    }
}

impl Config {
    /// Path of the rendered document
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output.dir).join(&self.output.file)
    }

    /// Directory downloaded images are written to
    pub fn image_dir(&self) -> PathBuf {
        match &self.images.dir {
            Some(dir) => PathBuf::from(dir),
            None => PathBuf::from(&self.output.dir).join("images"),
        }
    }
}
