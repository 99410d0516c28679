//! Crawler module for following a paginated guide
//!
//! This module contains the core crawling logic, including:
//! - Rate-limited HTTP fetching with retry logic
//! - "Next page" link resolution
//! - Pause/cancel signalling
//! - Overall crawl control

mod control;
mod controller;
mod fetcher;
mod links;

pub use control::CrawlControl;
pub use controller::Controller;
pub use fetcher::{build_http_client, AttemptOutcome, FetchStats, Fetcher};
pub use links::{next_url, resolve_link, NEXT_PAGE_MARKERS};

use crate::config::Config;
use crate::output::{Summary, TracingProgress};
use crate::ConfigError;

/// Runs a complete crawl with progress logged through `tracing`
///
/// This is the main entry point for a run. It will:
/// 1. Validate the start URL and build the HTTP client
/// 2. Follow the page chain, extracting every page
/// 3. Download referenced images
/// 4. Organize, render and write the document
///
/// # Arguments
///
/// * `config` - The run configuration
///
/// # Returns
///
/// * `Ok(Summary)` - The run happened; inspect the summary for failures
/// * `Err(ConfigError)` - The run could not start
pub async fn run(config: Config) -> Result<Summary, ConfigError> {
    let controller = Controller::new(config, Box::new(TracingProgress))?;
    Ok(controller.run().await)
}
