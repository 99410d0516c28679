//! Run summary returned by a crawl, and its console report

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;

/// Failed pages listed individually in the console report
const MAX_LISTED_FAILURES: usize = 10;

/// A page that could not be fetched or parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPage {
    pub url: String,
    pub reason: String,
}

/// An image that could not be materialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedImage {
    pub url: String,
    /// URL of the page that referenced it
    pub page: String,
}

/// Outcome of one crawl run
#[derive(Debug, Clone)]
pub struct Summary {
    /// At least one page was aggregated and the document was written
    pub success: bool,
    pub output_path: Option<PathBuf>,
    pub pages_processed: u32,
    pub images_processed: u32,
    pub failed_pages: Vec<FailedPage>,
    pub failed_images: Vec<FailedImage>,
    pub elapsed: Duration,
    /// The run was stopped through its control handle
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
}

impl Summary {
    /// An empty, unsuccessful summary starting now
    pub fn new() -> Self {
        Self {
            success: false,
            output_path: None,
            pages_processed: 0,
            images_processed: 0,
            failed_pages: Vec::new(),
            failed_images: Vec::new(),
            elapsed: Duration::ZERO,
            cancelled: false,
            started_at: Utc::now(),
        }
    }

    pub fn record_failed_page(&mut self, url: &str, reason: impl Into<String>) {
        self.failed_pages.push(FailedPage {
            url: url.to_string(),
            reason: reason.into(),
        });
    }
}

impl Default for Summary {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats a duration as "1h 2m 3s", dropping leading zero units
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    let mut text = String::new();
    if hours > 0 {
        text.push_str(&format!("{}h ", hours));
    }
    if hours > 0 || minutes > 0 {
        text.push_str(&format!("{}m ", minutes));
    }
    text.push_str(&format!("{}s", seconds));
    text
}

/// Builds the human-readable run report
pub fn format_summary(summary: &Summary, images_enabled: bool) -> String {
    let mut report = String::new();

    report.push_str("=== Guide Scraper Summary ===\n\n");
    report.push_str(&format!(
        "Started:          {}\n",
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    report.push_str(&format!(
        "Elapsed:          {}\n",
        format_elapsed(summary.elapsed)
    ));
    report.push_str(&format!(
        "Status:           {}\n",
        match (summary.success, summary.cancelled) {
            (true, false) => "completed",
            (true, true) => "cancelled (partial document written)",
            (false, true) => "cancelled",
            (false, false) => "failed",
        }
    ));
    report.push_str(&format!(
        "Pages processed:  {}\n",
        summary.pages_processed
    ));

    if images_enabled {
        report.push_str(&format!(
            "Images saved:     {}\n",
            summary.images_processed
        ));
        if !summary.failed_images.is_empty() {
            report.push_str(&format!(
                "Images failed:    {}\n",
                summary.failed_images.len()
            ));
        }
    }

    if !summary.failed_pages.is_empty() {
        report.push_str(&format!(
            "\nFailed pages:     {}\n",
            summary.failed_pages.len()
        ));
        for (i, failed) in summary
            .failed_pages
            .iter()
            .take(MAX_LISTED_FAILURES)
            .enumerate()
        {
            report.push_str(&format!(
                "  {}. {} - {}\n",
                i + 1,
                failed.url,
                failed.reason
            ));
        }
        if summary.failed_pages.len() > MAX_LISTED_FAILURES {
            report.push_str(&format!(
                "  ... and {} more\n",
                summary.failed_pages.len() - MAX_LISTED_FAILURES
            ));
        }
    }

    match &summary.output_path {
        Some(path) => report.push_str(&format!("\nOutput: {}\n", path.display())),
        None => report.push_str("\nNo output written\n"),
    }

    report
}

/// Prints the run report to stdout
pub fn print_summary(summary: &Summary, images_enabled: bool) {
    println!("\n{}", format_summary(summary, images_enabled));
}
