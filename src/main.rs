//! Guide Scraper main entry point
//!
//! This is the command-line interface for the Guide Scraper.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use guide_scraper::config::{default_config_toml, load_config_with_hash, validate, Config, Layout};
use guide_scraper::crawler::{Controller, CrawlControl};
use guide_scraper::output::{print_summary, TracingProgress};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Guide Scraper: turns a paginated online guide into one markdown file
///
/// Starting from the first page, the scraper follows "next page" links,
/// extracts each page's content, downloads its images and writes a single
/// document with a table of contents.
#[derive(Parser, Debug)]
#[command(name = "guide-scraper")]
#[command(version = "1.0.0")]
#[command(about = "Scrapes a paginated guide into one markdown document", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// First page of the guide (overrides crawl.start-url)
    #[arg(short, long)]
    url: Option<String>,

    /// Output directory (overrides output.dir)
    #[arg(long)]
    output_dir: Option<String>,

    /// Output file name (overrides output.file)
    #[arg(long)]
    output_file: Option<String>,

    /// Document layout (overrides output.layout)
    #[arg(long, value_enum, value_name = "LAYOUT")]
    layout: Option<LayoutArg>,

    /// Stop after this many pages (0 = no limit)
    #[arg(long)]
    max_pages: Option<u32>,

    /// Do not download images; reference them remotely
    #[arg(long)]
    no_images: bool,

    /// Download images even when a local copy exists
    #[arg(long)]
    force_download_images: bool,

    /// Stop at the first page that cannot be processed
    #[arg(long)]
    stop_on_error: bool,

    /// Delay between page requests in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the configuration and show what would be done without crawling
    #[arg(long, conflicts_with = "print_config")]
    dry_run: bool,

    /// Print a default configuration file and exit
    #[arg(long)]
    print_config: bool,
}

#[derive(Debug, Copy, Clone, ValueEnum, PartialEq, Eq)]
enum LayoutArg {
    /// Every page in one chapter
    Flat,
    /// Chapters and sections inferred from page titles
    Chapters,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Flat => Layout::Flat,
            LayoutArg::Chapters => Layout::Chapters,
        }
    }
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.crawl.start_url = Some(url.clone());
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        if let Some(file) = &self.output_file {
            config.output.file = file.clone();
        }
        if let Some(layout) = self.layout {
            config.output.layout = layout.into();
        }
        if let Some(max_pages) = self.max_pages {
            config.crawl.max_pages = max_pages;
        }
        if self.no_images {
            config.images.download = false;
        }
        if self.force_download_images {
            config.images.skip_existing = false;
        }
        if self.stop_on_error {
            config.crawl.continue_on_error = false;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.http.delay_ms = delay_ms;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", default_config_toml());
        return Ok(());
    }

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };
    cli.apply_overrides(&mut config);
    validate(&config).context("Invalid configuration")?;

    setup_logging(cli.verbose, cli.quiet, config.output.log_file.as_deref())?;

    if let Some(hash) = &config_hash {
        tracing::info!("Configuration loaded (hash: {})", hash);
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// When `log_file` is set, every line is also appended to that file
/// without ANSI colors.
fn setup_logging(verbose: u8, quiet: bool, log_file: Option<&str>) -> anyhow::Result<()> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("guide_scraper=info,warn"),
            1 => EnvFilter::new("guide_scraper=debug,info"),
            2 => EnvFilter::new("guide_scraper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let file_layer = match log_file {
        Some(path) => {
            let path = PathBuf::from(path);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false),
        )
        .with(file_layer)
        .init();

    Ok(())
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Guide Scraper Dry Run ===\n");

    println!("Crawl:");
    println!(
        "  Start URL: {}",
        config.crawl.start_url.as_deref().unwrap_or("(not set)")
    );
    println!("  First page number: {}", config.crawl.start_page);
    match config.crawl.max_pages {
        0 => println!("  Max pages: unlimited"),
        n => println!("  Max pages: {}", n),
    }
    println!("  Continue on error: {}", config.crawl.continue_on_error);

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Delay: {}ms", config.http.delay_ms);
    println!(
        "  Retries: {} ({}ms apart)",
        config.http.max_retries, config.http.retry_delay_ms
    );
    println!("  Timeout: {}s", config.http.timeout_secs);
    for (name, value) in &config.http.headers {
        println!("  Header: {}: {}", name, value);
    }

    println!("\nImages:");
    if config.images.download {
        println!("  Directory: {}", config.image_dir().display());
        println!("  Delay: {}ms", config.images.delay_ms);
        println!("  Reuse existing: {}", config.images.skip_existing);
    } else {
        println!("  Download disabled");
    }

    println!("\nOutput:");
    println!("  Document: {}", config.output_path().display());
    println!("  Layout: {:?}", config.output.layout);
    if let Some(log_file) = &config.output.log_file {
        println!("  Log file: {}", log_file);
    }

    if config.crawl.start_url.is_some() {
        println!("\n✓ Configuration is valid");
    } else {
        println!("\n✗ No start URL: pass --url or set crawl.start-url");
    }
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let images_enabled = config.images.download;
    let control = CrawlControl::new();

    let controller = Controller::new(config, Box::new(TracingProgress))
        .context("Cannot start crawl")?
        .with_control(control.clone());

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received; stopping after the current page");
            control.cancel();
        }
    });

    let summary = controller.run().await;
    print_summary(&summary, images_enabled);

    if summary.success {
        Ok(())
    } else if summary.cancelled {
        tracing::warn!("Crawl cancelled before any page was saved");
        Ok(())
    } else {
        anyhow::bail!("Crawl produced no document")
    }
}
