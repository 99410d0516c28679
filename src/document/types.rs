//! The aggregated, render-ready document model

use crate::extract::ContentItem;
use std::collections::HashMap;
use std::path::PathBuf;

/// Title of the placeholder document produced when no page was aggregated
pub const EMPTY_DOCUMENT_TITLE: &str = "Empty document";

/// Anchor id of the document title line
pub const DOCUMENT_TITLE_ID: &str = "document-title";

/// One multi-page guide, organized into chapters
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub title: String,
    pub source_url: String,
    pub chapters: Vec<Chapter>,
    pub toc: Vec<TocEntry>,
    pub page_titles: Vec<PageTitleInfo>,
}

impl Document {
    /// The document returned when nothing was aggregated
    pub fn empty() -> Self {
        Self {
            title: EMPTY_DOCUMENT_TITLE.to_string(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Every content item, chapter content before its sections, in order
    pub fn items(&self) -> impl Iterator<Item = &ContentItem> {
        self.chapters.iter().flat_map(|chapter| {
            chapter
                .content
                .iter()
                .chain(chapter.sections.iter().flat_map(|s| s.content.iter()))
        })
    }

    /// Image URL to local path for every image that has a local copy
    pub fn image_mapping(&self) -> HashMap<String, PathBuf> {
        self.items()
            .filter_map(|item| match item {
                ContentItem::Image {
                    url,
                    local_path: Some(path),
                    ..
                } => Some((url.clone(), path.clone())),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub title: String,
    pub id: String,
    pub content: Vec<ContentItem>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub id: String,
    pub content: Vec<ContentItem>,
}

/// One navigable line of the table of contents
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    /// Nesting depth, 0 (document title) through 3
    pub level: u8,
    pub title: String,
    pub id: String,
    pub page_number: Option<u32>,
    /// Dotted number such as "2.1" in the chaptered layout
    pub chapter_number: Option<String>,
}

impl TocEntry {
    pub fn new(level: u8, title: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            id: id.into(),
            page_number: None,
            chapter_number: None,
        }
    }
}

/// A "page N: title" marker found in a page's text
#[derive(Debug, Clone, PartialEq)]
pub struct PageTitleInfo {
    pub page_number: u32,
    pub title: String,
    /// The full marker text as it appeared on the page
    pub full_title: String,
    pub id: String,
    pub url: String,
}
