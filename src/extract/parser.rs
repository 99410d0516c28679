//! HTML to structured content extraction
//!
//! This module turns one fetched page into a title plus an ordered list of
//! typed content items:
//! - Ad, navigation and share/comment blocks are removed before anything else
//! - The primary content region is located by a prioritized selector list
//! - Block elements are visited in document order and mapped to content items
//! - Images are upgraded to full resolution and icons/banners are dropped

use crate::extract::content::{ContentItem, Extracted};
use crate::extract::filter::should_filter_text;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Placeholder used when a page offers no usable title
pub const UNKNOWN_TITLE: &str = "Unknown title";

/// Containers holding the article body, most specific first
const CONTENT_SELECTORS: &[&str] = &[
    "div.Mid2L_con",
    "div.article-content",
    "div.content",
    "article",
    "div.main-content",
];

/// Subtrees removed before extraction
const FILTER_SELECTORS: &[&str] = &[
    "div.adsbygoogle",
    "div.advertisement",
    "div.share",
    "div.comment",
    "div.related",
    "div.sidebar",
    "div.nav",
    "div.footer",
    "div.header",
    "nav",
    "footer",
    "script",
    "style",
    "iframe",
];

/// Attributes that may carry the image source, in priority order
const IMAGE_SOURCE_ATTRS: &[&str] = &["data-src", "src", "data-original"];

/// Hosts serving `_S` thumbnails next to their full-resolution originals
const FULL_RES_HOSTS: &[&str] = &["gamersky.com"];
const THUMBNAIL_SUFFIXES: &[(&str, &str)] = &[("_S.jpg", ".jpg"), ("_S.png", ".png")];

const IMAGE_DENY_KEYWORDS: &[&str] = &["icon", "logo", "banner", "advertisement"];
const IMAGE_DENY_TOKENS: &[&str] = &["ad", "ads"];
const IMAGE_DENY_FILENAMES: &[&str] = &["banner923.jpg"];

/// Title separators used to strip a trailing site name, in priority order
const TITLE_SEPARATORS: &[char] = &['-', '_', '|'];

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "img", "table", "ul", "ol", "pre",
    "blockquote",
];

/// Extracts titles and content items from guide pages
pub struct Extractor {
    content_selectors: Vec<Selector>,
    filter_selectors: Vec<Selector>,
    img: Selector,
    h1: Selector,
    title: Selector,
    meta_title: Vec<Selector>,
    body: Selector,
    row: Selector,
    cell: Selector,
    li: Selector,
    code: Selector,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    pub fn new() -> Self {
        Self {
            content_selectors: parse_selectors(CONTENT_SELECTORS),
            filter_selectors: parse_selectors(FILTER_SELECTORS),
            img: selector("img"),
            h1: selector("h1"),
            title: selector("title"),
            meta_title: parse_selectors(&[r#"meta[property="og:title"]"#, r#"meta[name="title"]"#]),
            body: selector("body"),
            row: selector("tr"),
            cell: selector("th, td"),
            li: selector("li"),
            code: selector("code"),
        }
    }

    /// Extracts title and content without a page URL
    ///
    /// Relative image URLs are kept as written.
    pub fn extract(&self, html: &str) -> Option<Extracted> {
        self.extract_with_base(html, None)
    }

    /// Extracts title and content, resolving relative image URLs against `base_url`
    ///
    /// # Returns
    ///
    /// * `Some(Extracted)` - The page title and its content items in document order
    /// * `None` - The input holds no HTML at all
    ///
    /// # Example
    ///
    /// ```
    /// use guide_scraper::extract::Extractor;
    ///
    /// let html = r#"<html><body><div class="content"><h1>Boss Guide</h1><p>Dodge left.</p></div></body></html>"#;
    /// let extracted = Extractor::new().extract(html).unwrap();
    /// assert_eq!(extracted.title, "Boss Guide");
    /// ```
    pub fn extract_with_base(&self, html: &str, base_url: Option<&Url>) -> Option<Extracted> {
        if html.trim().is_empty() {
            return None;
        }

        let mut document = Html::parse_document(html);
        self.remove_unwanted(&mut document);

        let title = self.extract_title(&document);
        let content = self.extract_content(&document, base_url);

        Some(Extracted { title, content })
    }

    /// Detaches every subtree matched by the filter selectors
    fn remove_unwanted(&self, document: &mut Html) {
        let ids: Vec<_> = self
            .filter_selectors
            .iter()
            .flat_map(|sel| document.select(sel).map(|el| el.id()).collect::<Vec<_>>())
            .collect();

        for id in ids {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
    }

    /// Resolves the page title: `<h1>`, then `<title>`, then meta tags
    fn extract_title(&self, document: &Html) -> String {
        if let Some(h1) = document
            .select(&self.h1)
            .map(element_text)
            .find(|text| !text.is_empty())
        {
            return h1;
        }

        if let Some(title) = document.select(&self.title).next() {
            let title = strip_site_suffix(&element_text(title));
            if !title.is_empty() {
                return title;
            }
        }

        for sel in &self.meta_title {
            if let Some(content) = document
                .select(sel)
                .filter_map(|meta| meta.value().attr("content"))
                .map(str::trim)
                .find(|content| !content.is_empty())
            {
                return content.to_string();
            }
        }

        UNKNOWN_TITLE.to_string()
    }

    fn extract_content(&self, document: &Html, base_url: Option<&Url>) -> Vec<ContentItem> {
        let region = self
            .content_selectors
            .iter()
            .find_map(|sel| document.select(sel).next())
            .or_else(|| document.select(&self.body).next())
            .unwrap_or_else(|| document.root_element());

        let mut content = Vec::new();
        self.walk_children(region, base_url, &mut content);
        content.retain(|item| !item.is_empty());
        content
    }

    fn walk_children(&self, element: ElementRef, base_url: Option<&Url>, out: &mut Vec<ContentItem>) {
        for child in element.children().filter_map(ElementRef::wrap) {
            self.visit(child, base_url, out);
        }
    }

    fn visit(&self, element: ElementRef, base_url: Option<&Url>, out: &mut Vec<ContentItem>) {
        let name = element.value().name();
        match name {
            "img" => out.extend(self.image_item(element, base_url)),
            "table" => {
                self.push_nested_images(element, base_url, out);
                out.extend(self.table_item(element));
            }
            "ul" | "ol" => {
                self.push_nested_images(element, base_url, out);
                out.extend(self.list_item(element, name == "ol"));
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.push_nested_images(element, base_url, out);
                let text = element_text(element);
                if !text.is_empty() {
                    let level = name[1..].parse().unwrap_or(1);
                    out.push(ContentItem::heading(text, level));
                }
            }
            "pre" => out.extend(self.code_item(element)),
            "blockquote" => {
                let text = element_text(element);
                if !text.is_empty() && !should_filter_text(&text) {
                    out.push(ContentItem::Quote { value: text });
                }
            }
            "p" => self.text_block(element, base_url, out),
            "div" if !has_block_descendant(element) => self.text_block(element, base_url, out),
            _ => self.walk_children(element, base_url, out),
        }
    }

    /// Paragraphs and leaf divs: nested images, then the filtered text
    fn text_block(&self, element: ElementRef, base_url: Option<&Url>, out: &mut Vec<ContentItem>) {
        self.push_nested_images(element, base_url, out);

        let text = element_text(element);
        if !text.is_empty() && !should_filter_text(&text) {
            out.push(ContentItem::text(text));
        }
    }

    fn push_nested_images(&self, element: ElementRef, base_url: Option<&Url>, out: &mut Vec<ContentItem>) {
        for img in element.select(&self.img) {
            out.extend(self.image_item(img, base_url));
        }
    }

    fn image_item(&self, img: ElementRef, base_url: Option<&Url>) -> Option<ContentItem> {
        let attrs = img.value();
        let raw = IMAGE_SOURCE_ATTRS
            .iter()
            .filter_map(|attr| attrs.attr(attr))
            .map(str::trim)
            .find(|src| !src.is_empty())?;

        let upgraded = upgrade_thumbnail(raw);
        let url = match base_url {
            Some(base) if !is_absolute(&upgraded) => base
                .join(&upgraded)
                .map(|u| u.to_string())
                .unwrap_or(upgraded),
            _ => upgraded,
        };

        if is_denylisted_image(&url) {
            tracing::trace!("Dropping denylisted image {}", url);
            return None;
        }

        let alt = attrs
            .attr("alt")
            .filter(|alt| !alt.trim().is_empty())
            .or_else(|| attrs.attr("title"))
            .unwrap_or("")
            .trim()
            .to_string();

        Some(ContentItem::image(url, alt))
    }

    /// First row becomes the header; remaining rows are data, row-major
    fn table_item(&self, table: ElementRef) -> Option<ContentItem> {
        let mut rows = table.select(&self.row).map(|tr| {
            tr.select(&self.cell)
                .map(element_text)
                .collect::<Vec<_>>()
        });

        let headers = rows.next()?;
        let rows: Vec<Vec<String>> = rows.filter(|row| !row.is_empty()).collect();
        if headers.is_empty() {
            return None;
        }

        Some(ContentItem::Table { headers, rows })
    }

    fn list_item(&self, list: ElementRef, ordered: bool) -> Option<ContentItem> {
        let items: Vec<String> = list
            .select(&self.li)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect();

        if items.is_empty() {
            return None;
        }

        Some(ContentItem::List { items, ordered })
    }

    fn code_item(&self, pre: ElementRef) -> Option<ContentItem> {
        let value = pre.text().collect::<String>().trim_matches('\n').to_string();
        if value.trim().is_empty() {
            return None;
        }

        let language = std::iter::once(pre)
            .chain(pre.select(&self.code))
            .flat_map(|el| el.value().classes())
            .find_map(|class| {
                class
                    .strip_prefix("language-")
                    .or_else(|| class.strip_prefix("lang-"))
            })
            .map(str::to_string);

        Some(ContentItem::Code { value, language })
    }
}

fn selector(source: &str) -> Selector {
    // Only called with the literal selectors in this module
    Selector::parse(source).unwrap_or_else(|_| panic!("invalid built-in selector: {source}"))
}

fn parse_selectors(sources: &[&str]) -> Vec<Selector> {
    sources
        .iter()
        .filter_map(|source| Selector::parse(source).ok())
        .collect()
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn has_block_descendant(element: ElementRef) -> bool {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|el| BLOCK_TAGS.contains(&el.value().name()))
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with("data:")
}

/// Strips a trailing site name from a `<title>` value
///
/// The first separator present (checked in `-`, `_`, `|` order) wins.
pub fn strip_site_suffix(title: &str) -> String {
    let title = title.trim();
    for sep in TITLE_SEPARATORS {
        if let Some((head, _)) = title.split_once(*sep) {
            return head.trim().to_string();
        }
    }
    title.to_string()
}

/// Rewrites a known site's thumbnail URL to its full-resolution original
pub fn upgrade_thumbnail(url: &str) -> String {
    if !FULL_RES_HOSTS.iter().any(|host| url.contains(host)) {
        return url.to_string();
    }

    for (thumb, full) in THUMBNAIL_SUFFIXES {
        if let Some(stem) = url.strip_suffix(thumb) {
            return format!("{stem}{full}");
        }
    }

    url.to_string()
}

/// Icons, logos, banners and ad images never become content
pub fn is_denylisted_image(url: &str) -> bool {
    let path = Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.split(['?', '#']).next().unwrap_or(url).to_string())
        .to_lowercase();

    if IMAGE_DENY_KEYWORDS.iter().any(|keyword| path.contains(keyword)) {
        return true;
    }

    let filename = path.rsplit('/').next().unwrap_or("");
    if IMAGE_DENY_FILENAMES.contains(&filename) {
        return true;
    }

    path.split(|c: char| !c.is_alphanumeric())
        .any(|token| IMAGE_DENY_TOKENS.contains(&token))
}
