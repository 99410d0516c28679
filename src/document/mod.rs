//! Multi-page aggregation into one structured document
//!
//! This module contains:
//! - The document model (chapters, sections, table of contents)
//! - The aggregator that owns all crawled pages
//! - Title-based chapter/section inference
//! - Anchor slug generation

mod aggregator;
mod slug;
mod structure;
mod types;

pub use aggregator::{Aggregator, Rejection};
pub use slug::slugify;
pub use structure::{build_chapters, chapter_toc, is_new_chapter, is_section, title_similarity};
pub use types::{
    Chapter, Document, PageTitleInfo, Section, TocEntry, DOCUMENT_TITLE_ID, EMPTY_DOCUMENT_TITLE,
};
