//! Accumulates crawled pages and organizes them into a [`Document`]

use super::slug::slugify;
use super::structure::{build_chapters, chapter_toc};
use super::types::{Chapter, Document, PageTitleInfo, TocEntry, DOCUMENT_TITLE_ID};
use crate::extract::{parse_page_title, ContentItem, PageContent};

/// Why a page was not accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    MissingUrl,
    MissingTitle,
    DuplicateUrl,
}

/// Owns every page of one crawl
///
/// Pages stay sorted by page number after every insertion; ties keep
/// insertion order.
#[derive(Debug, Default)]
pub struct Aggregator {
    pages: Vec<PageContent>,
    title: String,
    source_url: String,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page to the accumulated set
    ///
    /// The first accepted page fixes the document title and source URL.
    /// A page without a number gets `count + 1`.
    ///
    /// # Returns
    ///
    /// * `Ok(u32)` - The page number the page was stored under
    /// * `Err(Rejection)` - The page was ignored; nothing changed
    pub fn add_page(&mut self, mut page: PageContent) -> Result<u32, Rejection> {
        if page.url.trim().is_empty() {
            tracing::warn!("Ignoring page without URL");
            return Err(Rejection::MissingUrl);
        }
        if page.title.trim().is_empty() {
            tracing::warn!("Ignoring page without title: {}", page.url);
            return Err(Rejection::MissingTitle);
        }
        if self.contains(&page.url) {
            tracing::warn!("Page already added, skipping: {}", page.url);
            return Err(Rejection::DuplicateUrl);
        }

        if self.pages.is_empty() {
            self.title = page.title.clone();
            self.source_url = page.url.clone();
        }

        let page_number = match page.page_number {
            Some(n) => n,
            None => {
                let n = self.pages.len() as u32 + 1;
                page.page_number = Some(n);
                n
            }
        };

        tracing::info!("Added page {}: {}", page_number, page.title);
        self.pages.push(page);
        self.sort_pages();

        Ok(page_number)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.pages.iter().any(|p| p.url == url)
    }

    pub fn pages(&self) -> &[PageContent] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total image items across all pages
    pub fn image_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|p| p.content.iter())
            .filter(|item| matches!(item, ContentItem::Image { .. }))
            .count()
    }

    fn sort_pages(&mut self) {
        // Vec::sort_by_key is stable
        self.pages.sort_by_key(|p| p.page_number.unwrap_or(0));
    }

    /// Builds the flat, single-chapter document
    ///
    /// All page content is concatenated in page order into one chapter named
    /// after the document. The table of contents lists the document title and
    /// one entry per "page N: title" marker found in the pages.
    pub fn organize(&mut self) -> Document {
        if self.pages.is_empty() {
            tracing::warn!("No pages to organize");
            return Document::empty();
        }

        self.sort_pages();
        let page_titles = self.page_titles();

        let chapter = Chapter {
            title: self.title.clone(),
            id: slugify(&self.title),
            content: self
                .pages
                .iter()
                .flat_map(|p| p.content.iter().cloned())
                .collect(),
            sections: Vec::new(),
        };

        let mut toc = vec![TocEntry::new(0, &self.title, DOCUMENT_TITLE_ID)];
        toc.extend(page_titles.iter().map(|info| TocEntry {
            page_number: Some(info.page_number),
            ..TocEntry::new(1, &info.full_title, &info.id)
        }));

        Document {
            title: self.title.clone(),
            source_url: self.source_url.clone(),
            chapters: vec![chapter],
            toc,
            page_titles,
        }
    }

    /// Builds a multi-chapter document by inferring structure from page titles
    ///
    /// See [`build_chapters`] for the grouping rules.
    pub fn organize_by_chapters(&mut self) -> Document {
        if self.pages.is_empty() {
            tracing::warn!("No pages to organize");
            return Document::empty();
        }

        self.sort_pages();
        let chapters = build_chapters(&self.pages);
        let toc = chapter_toc(&self.title, &chapters);

        tracing::info!("Organized {} pages into {} chapters", self.pages.len(), chapters.len());

        Document {
            title: self.title.clone(),
            source_url: self.source_url.clone(),
            chapters,
            toc,
            page_titles: self.page_titles(),
        }
    }

    /// First "page N: title" text of every page, sorted by N
    fn page_titles(&self) -> Vec<PageTitleInfo> {
        let mut titles: Vec<PageTitleInfo> = self
            .pages
            .iter()
            .filter_map(|page| {
                page.content.iter().find_map(|item| match item {
                    ContentItem::Text { value } => {
                        let (number, title) = parse_page_title(value)?;
                        Some(PageTitleInfo {
                            page_number: number,
                            id: slugify(&format!("page-{}-{}", number, title)),
                            title,
                            full_title: value.trim().to_string(),
                            url: page.url.clone(),
                        })
                    }
                    _ => None,
                })
            })
            .collect();

        titles.sort_by_key(|t| t.page_number);
        titles
    }
}
