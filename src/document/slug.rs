/// Turns a title into an anchor-safe id
///
/// Lowercases, drops everything but letters, digits, whitespace and hyphens,
/// then collapses whitespace/hyphen runs into one hyphen. Non-ASCII letters
/// are kept as they are.
///
/// # Example
///
/// ```
/// use guide_scraper::document::slugify;
///
/// assert_eq!(slugify("Guide - Chapter 1"), "guide-chapter-1");
/// assert_eq!(slugify("Section (Intro)"), "section-intro");
/// ```
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.to_lowercase().chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        }
    }

    slug
}
