//! Small helpers over the scraper/ego-tree DOM shared by the extractor and converter.

use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Selector};

/// Elements whose text never counts as readable content.
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Parse a list of static selectors, skipping any the parser rejects.
pub(crate) fn compile_selectors(sources: &[&str]) -> Vec<Selector> {
    sources
        .iter()
        .filter_map(|source| Selector::parse(source).ok())
        .collect()
}

pub(crate) fn compile_selector(source: &str) -> Option<Selector> {
    Selector::parse(source).ok()
}

/// Raw descendant text, excluding script-like elements.
pub(crate) fn raw_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(*element, &mut out);
    out
}

/// Descendant text with whitespace runs collapsed to single spaces and trimmed.
pub(crate) fn normalized_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&raw_text(element))
}

/// Length in characters of [`normalized_text`].
pub(crate) fn text_len(element: ElementRef<'_>) -> usize {
    normalized_text(element).chars().count()
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) if NON_CONTENT_TAGS.contains(&element.name()) => {}
            Node::Element(_) => collect_text(child, out),
            _ => {}
        }
    }
}
