//! "Next page" link resolution
//!
//! Guide series link their pages with a "next page" anchor. This module finds
//! that anchor, resolves it against the current page and refuses links that
//! point straight back at the current page.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Visible anchor texts that mean "next page"
pub const NEXT_PAGE_MARKERS: &[&str] = &["下一页", "next page"];

/// Class-name fragment marking a pagination "next" anchor
const NEXT_CLASS_TOKEN: &str = "next";

/// Finds the URL of the next page in a series
///
/// # Search Order
///
/// 1. An anchor whose visible text is exactly a next-page marker
/// 2. An anchor whose visible text contains a next-page marker
/// 3. An anchor whose class attribute contains "next"
///
/// # Arguments
///
/// * `html` - The HTML of the current page
/// * `current_url` - The URL of the current page
///
/// # Returns
///
/// * `Some(String)` - Absolute URL of the next page
/// * `None` - No next link, or the link points back at `current_url`
///
/// # Example
///
/// ```
/// use guide_scraper::crawler::next_url;
///
/// let html = r#"<a href="page2.html">next page</a>"#;
/// assert_eq!(
///     next_url(html, "https://x.com/page1.html"),
///     Some("https://x.com/page2.html".to_string())
/// );
/// ```
pub fn next_url(html: &str, current_url: &str) -> Option<String> {
    if html.trim().is_empty() {
        return None;
    }

    let base_url = Url::parse(current_url).ok()?;
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").ok()?;
    let anchors: Vec<ElementRef> = document.select(&selector).collect();

    let anchor = anchors
        .iter()
        .find(|a| is_marker_text(&anchor_text(a), true))
        .or_else(|| anchors.iter().find(|a| is_marker_text(&anchor_text(a), false)))
        .or_else(|| anchors.iter().find(|a| has_next_class(a)));

    let Some(anchor) = anchor else {
        tracing::debug!("No next page link found on {}", current_url);
        return None;
    };

    let href = anchor.value().attr("href")?;
    let next = resolve_link(href, &base_url)?;

    if next == current_url {
        tracing::info!("Next page link points back to {}; stopping", current_url);
        return None;
    }

    tracing::debug!("Found next page link: {}", next);
    Some(next)
}

fn anchor_text(anchor: &ElementRef) -> String {
    anchor.text().collect::<String>().trim().to_string()
}

fn is_marker_text(text: &str, exact: bool) -> bool {
    if text.is_empty() {
        return false;
    }
    let lowered = text.to_lowercase();
    NEXT_PAGE_MARKERS.iter().any(|marker| {
        if exact {
            lowered == *marker
        } else {
            lowered.contains(marker)
        }
    })
}

fn has_next_class(anchor: &ElementRef) -> bool {
    anchor
        .value()
        .attr("class")
        .map(|class| class.to_lowercase().contains(NEXT_CLASS_TOKEN))
        .unwrap_or(false)
}

/// Resolves a link href to an absolute http(s) URL
///
/// Returns None if the link should be ignored:
/// - javascript:, mailto:, tel: and data: schemes
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
