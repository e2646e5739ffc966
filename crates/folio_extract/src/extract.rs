use std::sync::LazyLock;

use ego_tree::NodeId;
use folio_logging::{folio_debug, folio_trace};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::dom::{compile_selector, compile_selectors, text_len};
use crate::metadata::ArticleMetadata;
use crate::scoring::{best_candidate, MIN_CANDIDATE_CHARS};

/// Structural containers tried before scoring, in priority order.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "[role=\"main\"]",
    ".post-content",
    ".article-content",
    ".entry-content",
    ".content",
    "#article-content",
    "#content",
    ".rich_media_content",     // WeChat
    ".Post-RichTextContainer", // Zhihu
    "main",
];

/// Removed from the selected subtree before serialization.
const NOISE_SELECTORS: &[&str] = &[
    "script",
    "style",
    "nav",
    "footer",
    "header",
    ".sidebar",
    ".comments",
    ".ad",
    ".social-share",
    ".related-posts",
    ".navigation",
    "[role=\"navigation\"]",
    "iframe",
    "form",
    ".share-buttons",
];

static CONTENT: LazyLock<Vec<Selector>> = LazyLock::new(|| compile_selectors(CONTENT_SELECTORS));
static NOISE: LazyLock<Vec<Selector>> = LazyLock::new(|| compile_selectors(NOISE_SELECTORS));
static BODY: LazyLock<Option<Selector>> = LazyLock::new(|| compile_selector("body"));
static BASE: LazyLock<Option<Selector>> = LazyLock::new(|| compile_selector("base[href]"));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadabilityResult {
    pub title: Option<String>,
    pub author: Option<String>,
    pub site_name: Option<String>,
    pub excerpt: Option<String>,
    /// Inner HTML of the cleaned main-content subtree; may be empty.
    pub content_html: String,
    /// Page URL, or the `<base href>` resolved against it.
    pub base_url: Option<String>,
}

pub trait Extractor: Send + Sync {
    fn extract(&self, html: &str, url: &str) -> ReadabilityResult;
}

/// Readability-style extractor:
/// - metadata from Open Graph / meta tags with DOM fallbacks
/// - main content from a priority list of known containers
/// - otherwise the best-scoring block, or `<body>` when nothing scores
/// - noise (scripts, navigation, share widgets, forms) stripped in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadabilityExtractor;

impl Extractor for ReadabilityExtractor {
    fn extract(&self, html: &str, url: &str) -> ReadabilityResult {
        let mut doc = Html::parse_document(html);
        let metadata = ArticleMetadata::from_document(&doc);
        let base_url = resolve_base_url(&doc, url);

        let content_html = match select_content(&doc) {
            Some(content_id) => {
                strip_noise(&mut doc, content_id);
                doc.tree
                    .get(content_id)
                    .and_then(ElementRef::wrap)
                    .map(|element| element.inner_html())
                    .unwrap_or_default()
            }
            None => String::new(),
        };

        folio_debug!(
            "readability_done url={} title={:?} content_bytes={}",
            url,
            metadata.title,
            content_html.len()
        );

        ReadabilityResult {
            title: metadata.title,
            author: metadata.author,
            site_name: metadata.site_name,
            excerpt: metadata.excerpt,
            content_html,
            base_url,
        }
    }
}

/// Node id of the main-content element: known container, best score, or body.
fn select_content(doc: &Html) -> Option<NodeId> {
    for (selector, source) in CONTENT.iter().zip(CONTENT_SELECTORS) {
        if let Some(element) = doc.select(selector).next() {
            if text_len(element) >= MIN_CANDIDATE_CHARS {
                folio_trace!("content_selector_hit selector={}", source);
                return Some(element.id());
            }
        }
    }

    let body = BODY
        .as_ref()
        .and_then(|selector| doc.select(selector).next())
        .unwrap_or_else(|| doc.root_element());

    match best_candidate(body) {
        Some((element, score)) => {
            folio_trace!(
                "content_scored tag={} score={:.2} link_density={:.2}",
                element.value().name(),
                score.total,
                score.link_density
            );
            Some(element.id())
        }
        None => Some(body.id()),
    }
}

/// Detach every noise element below `root`; `root` itself is kept.
fn strip_noise(doc: &mut Html, root: NodeId) {
    let doomed: Vec<NodeId> = match doc.tree.get(root).and_then(ElementRef::wrap) {
        Some(element) => NOISE
            .iter()
            .flat_map(|selector| element.select(selector).map(|found| found.id()))
            .collect(),
        None => return,
    };

    for id in doomed {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn resolve_base_url(doc: &Html, url: &str) -> Option<String> {
    let page = Url::parse(url).ok();
    let declared = BASE
        .as_ref()
        .and_then(|selector| doc.select(selector).next())
        .and_then(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty());

    let resolved = match (page, declared) {
        (Some(page), Some(href)) => page.join(href).ok().or(Some(page)),
        (None, Some(href)) => Url::parse(href).ok(),
        (page, None) => page,
    };
    resolved.map(String::from)
}
