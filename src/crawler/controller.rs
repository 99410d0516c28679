//! Crawl controller - main page-chain orchestration logic
//!
//! This module contains the crawl loop that coordinates one run:
//! - Following the "next page" chain from the start URL
//! - Fetching, extracting and materializing images for every page
//! - Recording page and image failures without aborting the run
//! - Organizing, rendering and writing the final document

use crate::config::{validate_start_url, Config, Layout};
use crate::crawler::control::CrawlControl;
use crate::crawler::fetcher::{build_http_client, Fetcher};
use crate::crawler::links::next_url;
use crate::document::Aggregator;
use crate::extract::{ContentItem, Extractor};
use crate::images::ImageDownloader;
use crate::output::{save_markdown, FailedImage, ProgressSink, Renderer, Summary};
use crate::ConfigError;
use std::collections::HashSet;
use std::time::Instant;
use url::Url;

/// Reason recorded when a fetched page yields no content
const NO_CONTENT_REASON: &str = "no content could be extracted";

/// What the loop does after a page
enum Step {
    Next(String),
    Stop,
}

/// Main crawl controller structure
pub struct Controller {
    config: Config,
    start_url: Url,
    fetcher: Fetcher,
    extractor: Extractor,
    images: Option<ImageDownloader>,
    aggregator: Aggregator,
    progress: Box<dyn ProgressSink>,
    control: CrawlControl,
}

impl Controller {
    /// Creates a new controller instance
    ///
    /// No network activity happens here.
    ///
    /// # Arguments
    ///
    /// * `config` - The run configuration; must carry a start URL
    /// * `progress` - Sink for progress milestones
    ///
    /// # Returns
    ///
    /// * `Ok(Controller)` - Ready to run
    /// * `Err(ConfigError)` - Missing or invalid start URL, or a bad HTTP setting
    pub fn new(config: Config, progress: Box<dyn ProgressSink>) -> Result<Self, ConfigError> {
        let start_url = match config.crawl.start_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => validate_start_url(url)?,
            _ => return Err(ConfigError::MissingStartUrl),
        };

        let client = build_http_client(&config.http)?;
        let fetcher = Fetcher::with_client(client.clone(), &config.http);

        let images = if config.images.download {
            Some(ImageDownloader::new(
                client,
                config.image_dir(),
                &config.images,
            ))
        } else {
            None
        };

        Ok(Self {
            config,
            start_url,
            fetcher,
            extractor: Extractor::new(),
            images,
            aggregator: Aggregator::new(),
            progress,
            control: CrawlControl::new(),
        })
    }

    /// Replaces the control handle the loop observes
    pub fn with_control(mut self, control: CrawlControl) -> Self {
        self.control = control;
        self
    }

    /// A handle for pausing or cancelling this run from elsewhere
    pub fn control(&self) -> CrawlControl {
        self.control.clone()
    }

    /// Runs the crawl to completion
    ///
    /// Never fails: every page, image and output problem ends up in the
    /// returned [`Summary`].
    pub async fn run(mut self) -> Summary {
        let started = Instant::now();
        let mut summary = Summary::new();

        self.report(&format!("Starting crawl at {}", self.start_url), Some(0.0));
        tracing::info!(
            "Output: {}, images: {}",
            self.config.output_path().display(),
            if self.images.is_some() { "on" } else { "off" }
        );

        let max_pages = self.config.crawl.max_pages;
        let mut page_number = self.config.crawl.start_page;
        let mut visited: HashSet<String> = HashSet::new();
        let mut current = Some(self.start_url.to_string());

        while let Some(url) = current.take() {
            if self.control.is_cancelled() || !self.control.wait_if_paused().await {
                self.report("Crawl cancelled", None);
                summary.cancelled = true;
                break;
            }

            if max_pages > 0 && summary.pages_processed >= max_pages {
                self.report(&format!("Reached page limit of {}", max_pages), None);
                break;
            }

            visited.insert(url.clone());
            self.report(
                &format!("Fetching page {}: {}", page_number, url),
                self.percentage(summary.pages_processed),
            );

            let step = self.process_page(&url, page_number, &mut summary).await;

            current = match step {
                Step::Next(next) if visited.contains(&next) => {
                    self.report(&format!("Next link {} was already visited; stopping", next), None);
                    None
                }
                Step::Next(next) => Some(next),
                Step::Stop => None,
            };
            page_number += 1;
        }

        self.finish(&mut summary);
        summary.elapsed = started.elapsed();

        let fetch_stats = self.fetcher.stats();
        tracing::debug!(
            "Fetcher: {} attempts, {} retry sleeps, {} rate limit sleeps",
            fetch_stats.attempts,
            fetch_stats.retry_sleeps,
            fetch_stats.rate_limit_sleeps
        );
        if let Some(images) = &self.images {
            let stats = images.stats();
            tracing::debug!(
                "Images: {} attempted, {} downloaded, {} reused, {} failed",
                stats.attempted,
                stats.downloaded,
                stats.skipped_existing,
                stats.failed
            );
        }

        self.report("Crawl finished", Some(100.0));
        summary
    }

    /// Processes a single page
    ///
    /// This method:
    /// 1. Fetches the page
    /// 2. Extracts title and content
    /// 3. Downloads its images
    /// 4. Hands the page to the aggregator
    /// 5. Resolves the next link
    async fn process_page(&mut self, url: &str, page_number: u32, summary: &mut Summary) -> Step {
        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                // Without HTML there is no next link to follow
                self.report(&format!("Could not fetch {}", e.url()), None);
                summary.record_failed_page(e.url(), e.to_string());
                return Step::Stop;
            }
        };

        let base = Url::parse(url).ok();
        let extracted = self
            .extractor
            .extract_with_base(&html, base.as_ref())
            .filter(|e| !e.content.is_empty());

        let Some(extracted) = extracted else {
            self.report(&format!("Could not extract content from {}", url), None);
            summary.record_failed_page(url, NO_CONTENT_REASON);
            if !self.config.crawl.continue_on_error {
                return Step::Stop;
            }
            return self.next_step(&html, url);
        };

        let mut page = extracted.into_page(url, page_number);

        if let Some(images) = self.images.as_mut() {
            let image_items: Vec<&mut ContentItem> = page
                .content
                .iter_mut()
                .filter(|item| matches!(item, ContentItem::Image { .. }))
                .collect();

            if !image_items.is_empty() {
                let total = image_items.len();
                self.progress.report(
                    &format!("Downloading {} images from page {}", total, page_number),
                    None,
                );
                images.download_all(image_items).await;

                let mut saved = 0;
                for item in &page.content {
                    let Some(image_url) = item.image_url() else {
                        continue;
                    };
                    match item.local_path() {
                        Some(_) => saved += 1,
                        None => summary.failed_images.push(FailedImage {
                            url: image_url.to_string(),
                            page: url.to_string(),
                        }),
                    }
                }
                summary.images_processed += saved;

                if (saved as usize) < total {
                    tracing::warn!(
                        "{} of {} images on page {} failed to download",
                        total - saved as usize,
                        total,
                        page_number
                    );
                }
            }
        }

        if let Err(rejection) = self.aggregator.add_page(page) {
            summary.record_failed_page(url, format!("page rejected: {:?}", rejection));
            if !self.config.crawl.continue_on_error {
                return Step::Stop;
            }
        } else {
            summary.pages_processed += 1;
        }

        self.next_step(&html, url)
    }

    fn next_step(&self, html: &str, url: &str) -> Step {
        match next_url(html, url) {
            Some(next) => Step::Next(next),
            None => {
                self.report("Reached the last page", None);
                Step::Stop
            }
        }
    }

    /// Organizes, renders and writes whatever was aggregated
    fn finish(&mut self, summary: &mut Summary) {
        if self.aggregator.is_empty() {
            self.report("No pages were aggregated; nothing to write", None);
            return;
        }

        self.report(
            &format!(
                "Organizing {} pages with {} images",
                self.aggregator.len(),
                self.aggregator.image_count()
            ),
            None,
        );
        let document = match self.config.output.layout {
            Layout::Flat => self.aggregator.organize(),
            Layout::Chapters => self.aggregator.organize_by_chapters(),
        };
        let text = Renderer::new(document.image_mapping()).render(&document);

        let output_path = self.config.output_path();
        if save_markdown(&text, &output_path) {
            self.report(&format!("Guide saved to {}", output_path.display()), None);
            summary.success = true;
            summary.output_path = Some(output_path);
        } else {
            self.report("Failed to save the guide", None);
        }
    }

    fn percentage(&self, processed: u32) -> Option<f32> {
        let max_pages = self.config.crawl.max_pages;
        (max_pages > 0).then(|| processed as f32 / max_pages as f32 * 100.0)
    }

    fn report(&self, message: &str, percentage: Option<f32>) {
        self.progress.report(message, percentage);
    }
}
