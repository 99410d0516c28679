//! Configuration module for Guide Scraper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Defaults come from `Config::default()`; there is no global configuration table.
//!
//! # Example
//!
//! ```no_run
//! use guide_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("guide.toml")).unwrap();
//! println!("Writing to: {}", config.output_path().display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlConfig, HttpConfig, ImageConfig, Layout, OutputConfig};

// Re-export parser functions
pub use parser::{
    compute_config_hash, default_config_toml, load_config, load_config_with_hash, parse_config,
};
pub use validation::{validate, validate_start_url};
