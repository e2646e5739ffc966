//! Article metadata: title, author, site name and excerpt.
//!
//! Each field is a fallback chain over well-known meta tags and selectors;
//! every step yields `Option` and the first non-empty value wins.

use scraper::Html;

use crate::dom::{compile_selector, normalized_text};

/// Suffix separators stripped from `<title>`, in the order they are tried.
const TITLE_SEPARATORS: &[&str] = &[" - ", " | ", " :: ", " / ", " >> "];
/// A cleaned title must keep more than this many characters.
const MIN_CLEAN_TITLE_CHARS: usize = 10;
/// Author text taken from page elements must be shorter than this.
const MAX_AUTHOR_CHARS: usize = 100;
const AUTHOR_SELECTORS: &[&str] = &[".author", "[rel=\"author\"]", ".byline", "[itemprop=\"author\"]"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub site_name: Option<String>,
    pub excerpt: Option<String>,
}

impl ArticleMetadata {
    pub fn from_document(doc: &Html) -> Self {
        Self {
            title: extract_title(doc),
            author: extract_author(doc),
            site_name: meta_content(doc, "meta[property=\"og:site_name\"]"),
            excerpt: meta_content(doc, "meta[property=\"og:description\"]")
                .or_else(|| meta_content(doc, "meta[name=\"description\"]")),
        }
    }
}

pub fn extract_title(doc: &Html) -> Option<String> {
    meta_content(doc, "meta[property=\"og:title\"]")
        .or_else(|| first_text(doc, "title").map(|title| clean_title(&title)))
        .or_else(|| first_text(doc, "h1"))
}

/// Strip a trailing `" - Site"` style suffix when enough of the title remains.
pub fn clean_title(title: &str) -> String {
    for separator in TITLE_SEPARATORS {
        if let Some(idx) = title.rfind(separator) {
            let candidate = &title[..idx];
            if candidate.chars().count() > MIN_CLEAN_TITLE_CHARS {
                return candidate.trim().to_string();
            }
        }
    }
    title.to_string()
}

pub fn extract_author(doc: &Html) -> Option<String> {
    meta_content(doc, "meta[name=\"author\"]")
        .or_else(|| meta_content(doc, "meta[property=\"article:author\"]"))
        .or_else(|| {
            AUTHOR_SELECTORS.iter().find_map(|selector| {
                first_text(doc, selector).filter(|text| text.chars().count() < MAX_AUTHOR_CHARS)
            })
        })
}

/// Trimmed, non-empty `content` attribute of the first element matching `selector`.
fn meta_content(doc: &Html, selector: &str) -> Option<String> {
    let selector = compile_selector(selector)?;
    doc.select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
}

/// Normalized, non-empty text of the first element matching `selector`.
fn first_text(doc: &Html, selector: &str) -> Option<String> {
    let selector = compile_selector(selector)?;
    doc.select(&selector)
        .next()
        .map(normalized_text)
        .filter(|text| !text.is_empty())
}
