//! Content extraction from fetched guide pages
//!
//! This module contains:
//! - The typed content model shared by the whole pipeline
//! - The HTML extractor (title resolution, block walking, image handling)
//! - The text noise filter and "page N: title" marker parsing

mod content;
pub mod filter;
mod parser;

pub use content::{ContentItem, Extracted, PageContent};
pub use filter::{page_marker_count, parse_page_title, should_filter_text};
pub use parser::{is_denylisted_image, strip_site_suffix, upgrade_thumbnail, Extractor, UNKNOWN_TITLE};
