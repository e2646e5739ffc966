//! Score-based main content selection.
//!
//! Used when no structural selector yields a long enough container. The
//! constants are empirically tuned and kept fixed; fixtures depend on them.

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use crate::dom::{compile_selector, text_len};

/// Elements with less normalized text than this are never candidates.
pub const MIN_CANDIDATE_CHARS: usize = 50;
pub const KEYWORD_WEIGHT: f64 = 25.0;
pub const PARAGRAPH_WEIGHT: f64 = 3.0;
pub const CHARS_PER_POINT: f64 = 100.0;
pub const LINK_DENSITY_LIMIT: f64 = 0.5;
pub const LINK_DENSITY_PENALTY: f64 = 50.0;

const POSITIVE_KEYWORDS: &[&str] = &["article", "content", "post", "body", "text", "entry", "main"];
const NEGATIVE_KEYWORDS: &[&str] = &[
    "comment", "sidebar", "nav", "footer", "header", "menu", "ad", "social", "share", "related",
];

static CANDIDATE_SELECTOR: LazyLock<Option<Selector>> =
    LazyLock::new(|| compile_selector("div, section, article, td"));
static PARAGRAPH_SELECTOR: LazyLock<Option<Selector>> = LazyLock::new(|| compile_selector("p"));
static ANCHOR_SELECTOR: LazyLock<Option<Selector>> = LazyLock::new(|| compile_selector("a"));

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub class_id_weight: f64,
    pub paragraph_bonus: f64,
    pub length_bonus: f64,
    pub link_density: f64,
    pub total: f64,
}

/// Score one element, or `None` when it is too short to be a candidate.
pub fn score_element(element: ElementRef<'_>) -> Option<CandidateScore> {
    let length = text_len(element);
    if length < MIN_CANDIDATE_CHARS {
        return None;
    }

    let class_id_weight = class_id_weight(
        element.value().attr("class").unwrap_or_default(),
        element.value().attr("id").unwrap_or_default(),
    );
    let paragraph_bonus = count_matches(element, &PARAGRAPH_SELECTOR) as f64 * PARAGRAPH_WEIGHT;
    let length_bonus = length as f64 / CHARS_PER_POINT;
    let link_density = link_density(element, length);

    let mut total = class_id_weight + paragraph_bonus + length_bonus;
    if link_density > LINK_DENSITY_LIMIT {
        total -= LINK_DENSITY_PENALTY;
    }

    Some(CandidateScore {
        class_id_weight,
        paragraph_bonus,
        length_bonus,
        link_density,
        total,
    })
}

/// Keyword weight; class and id are checked independently so both can fire.
pub fn class_id_weight(class: &str, id: &str) -> f64 {
    let class = class.to_lowercase();
    let id = id.to_lowercase();
    let hits = |keyword: &&str| usize::from(class.contains(*keyword)) + usize::from(id.contains(*keyword));

    let positive: usize = POSITIVE_KEYWORDS.iter().map(hits).sum();
    let negative: usize = NEGATIVE_KEYWORDS.iter().map(hits).sum();
    (positive as f64 - negative as f64) * KEYWORD_WEIGHT
}

/// Share of the element's text that sits inside anchors.
pub fn link_density(element: ElementRef<'_>, total_len: usize) -> f64 {
    if total_len == 0 {
        return 0.0;
    }
    let anchor_len: usize = match ANCHOR_SELECTOR.as_ref() {
        Some(selector) => element.select(selector).map(text_len).sum(),
        None => 0,
    };
    anchor_len as f64 / total_len as f64
}

/// Highest-scoring candidate under `root` with a score above zero.
///
/// Ties keep the element seen first in document order.
pub fn best_candidate<'a>(root: ElementRef<'a>) -> Option<(ElementRef<'a>, CandidateScore)> {
    let selector = CANDIDATE_SELECTOR.as_ref()?;
    let mut best: Option<(ElementRef<'a>, CandidateScore)> = None;

    for element in root.select(selector) {
        let Some(score) = score_element(element) else {
            continue;
        };
        let is_better = match &best {
            Some((_, current)) => score.total > current.total,
            None => true,
        };
        if is_better {
            best = Some((element, score));
        }
    }

    best.filter(|(_, score)| score.total > 0.0)
}

fn count_matches(element: ElementRef<'_>, selector: &Option<Selector>) -> usize {
    selector
        .as_ref()
        .map_or(0, |selector| element.select(selector).count())
}
