//! Chapter and section inference from page titles
//!
//! The rules are string heuristics tuned for serialized game guides:
//! - A page opens a new chapter when its title carries a chapter keyword the
//!   current chapter title lacks, or when the two titles share less than half
//!   of their distinct characters.
//! - Inside a chapter, a later page opens a section when its title carries a
//!   section keyword, or when its character overlap with the chapter title is
//!   in `[0.3, 0.7)`. A title contained in the chapter title never does.
//! - Heading items of level 3 or 4 inside a section become TOC subsections.

use super::slug::slugify;
use super::types::{Chapter, Section, TocEntry, DOCUMENT_TITLE_ID};
use crate::extract::{ContentItem, PageContent};
use std::collections::HashSet;

const CHAPTER_KEYWORDS: &[&str] = &["章", "篇", "Chapter", "攻略"];
const SECTION_KEYWORDS: &[&str] = &["节", "部分", "Section", "技巧", "心得"];

const NEW_CHAPTER_BELOW: f64 = 0.5;
const SECTION_RANGE: std::ops::Range<f64> = 0.3..0.7;

/// Shared distinct characters over the larger distinct-character count
///
/// Two empty titles are identical (1.0).
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let a: HashSet<char> = a.chars().collect();
    let b: HashSet<char> = b.chars().collect();
    let larger = a.len().max(b.len());
    if larger == 0 {
        return 1.0;
    }
    a.intersection(&b).count() as f64 / larger as f64
}

pub fn is_new_chapter(title: &str, chapter_title: &str) -> bool {
    let keyword_change = CHAPTER_KEYWORDS
        .iter()
        .any(|k| title.contains(k) && !chapter_title.contains(k));

    keyword_change || title_similarity(title, chapter_title) < NEW_CHAPTER_BELOW
}

pub fn is_section(title: &str, chapter_title: &str) -> bool {
    if chapter_title.contains(title) {
        return false;
    }
    if SECTION_KEYWORDS.iter().any(|k| title.contains(k)) {
        return true;
    }
    SECTION_RANGE.contains(&title_similarity(title, chapter_title))
}

/// Groups sorted pages into chapters and sections
///
/// A chapter's own content is its first page plus any following pages that
/// come before its first section. Pages after a section that do not open a
/// new one are appended to that section.
pub fn build_chapters(pages: &[PageContent]) -> Vec<Chapter> {
    let mut chapters: Vec<Chapter> = Vec::new();

    for page in pages {
        let opens_chapter = match chapters.last() {
            None => true,
            Some(current) => is_new_chapter(&page.title, &current.title),
        };

        if opens_chapter {
            chapters.push(Chapter {
                title: page.title.clone(),
                id: slugify(&page.title),
                content: page.content.clone(),
                sections: Vec::new(),
            });
            continue;
        }

        let Some(chapter) = chapters.last_mut() else {
            continue;
        };

        if is_section(&page.title, &chapter.title) {
            chapter.sections.push(Section {
                title: page.title.clone(),
                id: slugify(&page.title),
                content: page.content.clone(),
            });
        } else if let Some(section) = chapter.sections.last_mut() {
            section.content.extend(page.content.iter().cloned());
        } else {
            chapter.content.extend(page.content.iter().cloned());
        }
    }

    chapters
}

/// Numbered table of contents for the chaptered layout
///
/// Levels: 0 document, 1 chapter ("n."), 2 section ("n.m"), 3 subsection
/// ("n.m.k") taken from level 3-4 headings inside the section.
pub fn chapter_toc(document_title: &str, chapters: &[Chapter]) -> Vec<TocEntry> {
    let mut toc = Vec::new();

    if !document_title.is_empty() {
        toc.push(TocEntry::new(0, document_title, DOCUMENT_TITLE_ID));
    }

    for (i, chapter) in chapters.iter().enumerate() {
        let chapter_number = format!("{}", i + 1);
        toc.push(TocEntry {
            chapter_number: Some(chapter_number.clone()),
            ..TocEntry::new(1, format!("{}. {}", chapter_number, chapter.title), &chapter.id)
        });

        for (j, section) in chapter.sections.iter().enumerate() {
            let section_number = format!("{}.{}", chapter_number, j + 1);
            toc.push(TocEntry {
                chapter_number: Some(section_number.clone()),
                ..TocEntry::new(2, format!("{} {}", section_number, section.title), &section.id)
            });

            for (k, heading) in subsection_headings(&section.content).enumerate() {
                let number = format!("{}.{}", section_number, k + 1);
                toc.push(TocEntry {
                    chapter_number: Some(number.clone()),
                    ..TocEntry::new(3, format!("{} {}", number, heading), slugify(heading))
                });
            }
        }
    }

    toc
}

fn subsection_headings(content: &[ContentItem]) -> impl Iterator<Item = &str> {
    content.iter().filter_map(|item| match item {
        ContentItem::Heading { value, level } if (3..=4).contains(level) && !value.is_empty() => {
            Some(value.as_str())
        }
        _ => None,
    })
}
