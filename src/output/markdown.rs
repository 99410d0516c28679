//! Markdown rendering of aggregated documents
//!
//! Layout:
//! - `# title` with the document anchor, then the source link
//! - `## Contents` with one indented link per TOC entry, then a rule
//! - `## n. chapter` blocks, each followed by its `### n.m section` blocks
//! - the first "page N: title" line of each page carries that page's anchor
//!
//! Images with a local copy are referenced as `images/<file name>`, relative
//! to the rendered file.

use crate::document::{slugify, Document, TocEntry, DOCUMENT_TITLE_ID};
use crate::extract::ContentItem;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory prefix for local image references
pub const IMAGE_PREFIX: &str = "images";

/// Renders a [`Document`] to markdown text
pub struct Renderer {
    image_paths: HashMap<String, PathBuf>,
}

impl Renderer {
    /// Creates a renderer with a URL to local path mapping for images
    pub fn new(image_paths: HashMap<String, PathBuf>) -> Self {
        Self { image_paths }
    }

    /// Renders the whole document
    pub fn render(&self, document: &Document) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "# {} <a id=\"{}\"></a>\n\n",
            document.title, DOCUMENT_TITLE_ID
        ));

        if !document.source_url.is_empty() {
            md.push_str(&format!(
                "*Source: [{0}]({0})*\n\n",
                document.source_url
            ));
        }

        let mut page_anchors: HashMap<&str, &str> = document
            .page_titles
            .iter()
            .map(|info| (info.full_title.as_str(), info.id.as_str()))
            .collect();

        if !document.toc.is_empty() {
            md.push_str("## Contents\n\n");
            md.push_str(&render_toc(&document.toc));
            md.push_str("\n---\n\n");
        }

        for (i, chapter) in document.chapters.iter().enumerate() {
            let chapter_number = i + 1;
            md.push_str(&format!(
                "## {}. {} <a id=\"{}\"></a>\n\n",
                chapter_number, chapter.title, chapter.id
            ));
            md.push_str(&self.render_items(&chapter.content, &mut page_anchors));

            for (j, section) in chapter.sections.iter().enumerate() {
                md.push_str(&format!(
                    "### {}.{} {} <a id=\"{}\"></a>\n\n",
                    chapter_number,
                    j + 1,
                    section.title,
                    section.id
                ));
                md.push_str(&self.render_items(&section.content, &mut page_anchors));
            }
        }

        md
    }

    /// Renders a run of items; each page anchor is emitted once
    fn render_items(&self, items: &[ContentItem], page_anchors: &mut HashMap<&str, &str>) -> String {
        let mut md = String::new();
        for item in items {
            let anchor = match item {
                ContentItem::Text { value } => page_anchors.remove(value.trim()),
                _ => None,
            };
            let block = match (anchor, item) {
                (Some(id), ContentItem::Text { value }) => {
                    format!("{} <a id=\"{}\"></a>\n", value, id)
                }
                _ => match self.render_item(item) {
                    Some(block) => block,
                    None => continue,
                },
            };
            md.push_str(&block);
            md.push('\n');
        }
        md
    }

    /// Renders one content item as a block (without the trailing blank line)
    fn render_item(&self, item: &ContentItem) -> Option<String> {
        if item.is_empty() {
            return None;
        }

        let block = match item {
            ContentItem::Text { value } => format!("{}\n", value),

            ContentItem::Image { url, alt, .. } => match self.local_reference(url) {
                Some(local) => format!("![{}]({})\n", alt, local),
                None => format!("![{}]({})\n", alt, url),
            },

            // Chapter and section headings occupy the top two levels
            ContentItem::Heading { value, level } => {
                let marks = "#".repeat((*level as usize + 1).min(6));
                if (3..=4).contains(level) {
                    format!("{} {} <a id=\"{}\"></a>\n", marks, value, slugify(value))
                } else {
                    format!("{} {}\n", marks, value)
                }
            }

            ContentItem::List { items, ordered } => {
                let mut block = String::new();
                for (i, entry) in items.iter().enumerate() {
                    if *ordered {
                        block.push_str(&format!("{}. {}\n", i + 1, entry));
                    } else {
                        block.push_str(&format!("- {}\n", entry));
                    }
                }
                block
            }

            ContentItem::Table { headers, rows } => {
                let columns = headers
                    .len()
                    .max(rows.iter().map(Vec::len).max().unwrap_or(0));
                let mut block = table_row(headers, columns);
                block.push_str(&table_row(&vec!["---".to_string(); columns], columns));
                for row in rows {
                    block.push_str(&table_row(row, columns));
                }
                block
            }

            ContentItem::Code { value, language } => format!(
                "```{}\n{}\n```\n",
                language.as_deref().unwrap_or_default(),
                value
            ),

            ContentItem::Quote { value } => value
                .lines()
                .map(|line| format!("> {}\n", line))
                .collect(),
        };

        Some(block)
    }

    fn local_reference(&self, url: &str) -> Option<String> {
        let path = self.image_paths.get(url)?;
        let name = path.file_name()?.to_string_lossy();
        Some(format!("{}/{}", IMAGE_PREFIX, name))
    }
}

/// Renders a document with the given image mapping
///
/// # Example
///
/// ```
/// use guide_scraper::{render, Document};
/// use std::collections::HashMap;
///
/// let text = render(&Document::empty(), &HashMap::new());
/// assert!(text.starts_with("# Empty document"));
/// ```
pub fn render(document: &Document, image_paths: &HashMap<String, PathBuf>) -> String {
    Renderer::new(image_paths.clone()).render(document)
}

fn render_toc(toc: &[TocEntry]) -> String {
    let mut md = String::new();
    for entry in toc {
        if entry.title.is_empty() || entry.id.is_empty() {
            continue;
        }
        md.push_str(&format!(
            "{}- [{}](#{})\n",
            "  ".repeat(entry.level as usize),
            entry.title,
            entry.id
        ));
    }
    md
}

fn table_row(cells: &[String], columns: usize) -> String {
    let mut padded: Vec<&str> = cells.iter().map(|c| c.as_str()).collect();
    padded.resize(columns, "");
    format!("| {} |\n", padded.join(" | "))
}

/// Writes rendered text to `path`, creating parent directories
///
/// # Returns
///
/// `true` on success; failures are logged, never returned
pub fn save_markdown(text: &str, path: &Path) -> bool {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent) {
            tracing::error!("Failed to create {}: {}", parent.display(), e);
            return false;
        }
    }

    match fs::write(path, text) {
        Ok(()) => {
            tracing::info!("Markdown saved to {}", path.display());
            true
        }
        Err(e) => {
            tracing::error!("Failed to write {}: {}", path.display(), e);
            false
        }
    }
}
