//! Boilerplate and pagination-noise filtering for text items
//!
//! Guide sites surround the article body with edit credits, "see more" teasers
//! and long page indexes ("page 1: ... page 2: ..."). Those are dropped here.
//! A lone "page N: title" line survives because the aggregator reads it as the
//! title of that page.

use regex::Regex;
use std::sync::LazyLock;

/// Phrases that mark a text block as boilerplate
const NOISE_KEYWORDS: &[&str] = &[
    "更多相关内容请关注",
    "责任编辑",
    "友情提示：支持键盘",
    "翻页",
    "本文是否解决了您的问题",
    "已解决",
    "未解决",
    "文章内容导航",
    "上一页",
    "下一页",
    "see more",
    "edited by",
    "editor:",
    "previous page",
    "next page",
    "page navigation",
    "was this article helpful",
];

/// Long texts carrying both halves of a "第N页：" marker are page indexes
const LONG_TEXT_MARKER: (&str, &str) = ("第", "页：");
const LONG_TEXT_CHARS: usize = 200;

static PAGE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:第\s*\d+\s*页|page\s*\d+)\s*[:：]").expect("valid page marker regex")
});

static PAGE_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:第\s*(\d+)\s*页|page\s*(\d+))\s*[:：]\s*(.+)$")
        .expect("valid page title regex")
});

static DIGITS_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s]+$").expect("valid digits regex"));

/// Number of "page N:" markers in the text
pub fn page_marker_count(text: &str) -> usize {
    PAGE_MARKER.find_iter(text).count()
}

/// Splits a "page N: title" line into its number and title
///
/// Returns `None` when the (trimmed) text is not exactly such a line.
pub fn parse_page_title(text: &str) -> Option<(u32, String)> {
    let caps = PAGE_TITLE.captures(text.trim())?;
    let number = caps.get(1).or_else(|| caps.get(2))?.as_str().parse().ok()?;
    let title = caps.get(3)?.as_str().trim();
    if title.is_empty() {
        return None;
    }
    Some((number, title.to_string()))
}

/// A single isolated "page N: title" line
fn is_single_page_title(text: &str) -> bool {
    parse_page_title(text).is_some() && page_marker_count(text) == 1
}

fn has_marker_fragments(text: &str) -> bool {
    let (prefix, suffix) = LONG_TEXT_MARKER;
    (text.contains(prefix) && text.contains(suffix)) || PAGE_MARKER.is_match(text)
}

/// Decides whether a text block is noise that should not become a content item
pub fn should_filter_text(text: &str) -> bool {
    let text = text.trim();
    let lowered = text.to_lowercase();

    if NOISE_KEYWORDS.iter().any(|keyword| lowered.contains(keyword)) {
        return true;
    }

    if is_single_page_title(text) {
        return false;
    }

    if page_marker_count(text) > 1 {
        return true;
    }

    if text.chars().count() > LONG_TEXT_CHARS && has_marker_fragments(text) {
        return true;
    }

    DIGITS_ONLY.is_match(text) && text.split_whitespace().count() > 3
}
