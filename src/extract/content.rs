//! Structured page content types

use std::path::PathBuf;

/// One typed unit of extracted page content
#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    Text {
        value: String,
    },
    Image {
        url: String,
        alt: String,
        /// Set by the image materializer once the file is on disk
        local_path: Option<PathBuf>,
    },
    Heading {
        value: String,
        level: u8,
    },
    List {
        items: Vec<String>,
        ordered: bool,
    },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Code {
        value: String,
        language: Option<String>,
    },
    Quote {
        value: String,
    },
}

impl ContentItem {
    pub fn text(value: impl Into<String>) -> Self {
        ContentItem::Text {
            value: value.into(),
        }
    }

    pub fn image(url: impl Into<String>, alt: impl Into<String>) -> Self {
        ContentItem::Image {
            url: url.into(),
            alt: alt.into(),
            local_path: None,
        }
    }

    pub fn heading(value: impl Into<String>, level: u8) -> Self {
        ContentItem::Heading {
            value: value.into(),
            level,
        }
    }

    /// Whether the item carries anything worth keeping
    pub fn is_empty(&self) -> bool {
        match self {
            ContentItem::Text { value }
            | ContentItem::Heading { value, .. }
            | ContentItem::Code { value, .. }
            | ContentItem::Quote { value } => value.trim().is_empty(),
            ContentItem::Image { url, .. } => url.trim().is_empty(),
            ContentItem::List { items, .. } => items.is_empty(),
            ContentItem::Table { headers, rows } => headers.is_empty() && rows.is_empty(),
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        match self {
            ContentItem::Image { url, .. } => Some(url),
            _ => None,
        }
    }

    pub fn local_path(&self) -> Option<&PathBuf> {
        match self {
            ContentItem::Image { local_path, .. } => local_path.as_ref(),
            _ => None,
        }
    }
}

/// Everything extracted from one fetched page
#[derive(Debug, Clone, PartialEq)]
pub struct PageContent {
    pub url: String,
    pub title: String,
    /// 1-based position in the series; assigned on insertion when absent
    pub page_number: Option<u32>,
    pub content: Vec<ContentItem>,
}

impl PageContent {
    pub fn new(url: impl Into<String>, title: impl Into<String>, content: Vec<ContentItem>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            page_number: None,
            content,
        }
    }

    pub fn with_page_number(mut self, page_number: u32) -> Self {
        self.page_number = Some(page_number);
        self
    }
}

/// Title and content pulled out of a single HTML document
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub title: String,
    pub content: Vec<ContentItem>,
}

impl Extracted {
    /// Attaches crawl position information, producing a page ready for aggregation
    pub fn into_page(self, url: impl Into<String>, page_number: u32) -> PageContent {
        PageContent::new(url, self.title, self.content).with_page_number(page_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_empty() {
        assert!(ContentItem::text("   ").is_empty());
        assert!(ContentItem::image("", "alt").is_empty());
        assert!(!ContentItem::heading("Bosses", 2).is_empty());
        assert!(ContentItem::List {
            items: vec![],
            ordered: false
        }
        .is_empty());
    }

    #[test]
    fn test_image_accessors() {
        let mut item = ContentItem::image("https://example.com/a.jpg", "");
        assert_eq!(item.image_url(), Some("https://example.com/a.jpg"));
        assert_eq!(item.local_path(), None);

        if let ContentItem::Image { local_path, .. } = &mut item {
            *local_path = Some(PathBuf::from("images/a.jpg"));
        }
        assert_eq!(item.local_path(), Some(&PathBuf::from("images/a.jpg")));
        assert_eq!(ContentItem::text("hello").image_url(), None);
    }
}
