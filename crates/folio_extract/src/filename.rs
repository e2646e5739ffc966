use std::fmt::Write;

use sha2::{Digest, Sha256};

/// Longest title stem kept in a filename, in characters.
const MAX_STEM_CHARS: usize = 80;
const FALLBACK_STEM: &str = "untitled";

/// Deterministic, filesystem-safe name: `{sanitized_title}--{hash8}.md`,
/// where `hash8` is the first 8 hex digits of SHA-256 over the URL.
pub fn article_filename(title: Option<&str>, url: &str) -> String {
    format!("{}--{}.md", sanitize_stem(title.unwrap_or(FALLBACK_STEM)), url_hash(url))
}

fn sanitize_stem(title: &str) -> String {
    let mut stem = String::with_capacity(title.len());
    for c in title.chars() {
        let c = if is_forbidden(c) || c.is_whitespace() { '_' } else { c };
        if c == '_' && stem.ends_with('_') {
            continue;
        }
        stem.push(c);
    }

    let stem: String = stem
        .trim_matches(&['_', '.'][..])
        .chars()
        .take(MAX_STEM_CHARS)
        .collect();
    let mut stem = stem.trim_end_matches(&['_', '.'][..]).to_string();
    if stem.is_empty() {
        stem = FALLBACK_STEM.to_string();
    }
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    stem
}

fn is_forbidden(c: char) -> bool {
    matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control()
}

fn is_reserved_windows_name(name: &str) -> bool {
    const DEVICES: &[&str] = &["CON", "PRN", "AUX", "NUL"];
    let upper = name.to_ascii_uppercase();
    if DEVICES.contains(&upper.as_str()) {
        return true;
    }
    ["COM", "LPT"].iter().any(|prefix| {
        upper
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.len() == 1 && matches!(rest.as_bytes()[0], b'1'..=b'9'))
    })
}

fn url_hash(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    digest.iter().take(4).fold(String::with_capacity(8), |mut hex, byte| {
        let _ = write!(hex, "{byte:02x}");
        hex
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn same_inputs_give_same_name() {
        let a = article_filename(Some("Hello World"), "https://example.com/a");
        let b = article_filename(Some("Hello World"), "https://example.com/a");
        let other = article_filename(Some("Hello World"), "https://example.com/b");
        assert_eq!(a, b);
        assert_ne!(a, other);
        assert!(a.starts_with("Hello_World--"));
        assert_eq!(a.len(), "Hello_World--".len() + 8 + ".md".len());
    }

    #[test]
    fn forbidden_characters_collapse() {
        let name = article_filename(Some("a: b / c?? <d>"), "u");
        assert!(name.starts_with("a_b_c_d--"), "{name}");
    }

    #[test]
    fn empty_or_missing_title_uses_fallback() {
        assert!(article_filename(None, "u").starts_with("untitled--"));
        assert!(article_filename(Some(" ?? "), "u").starts_with("untitled--"));
    }

    #[test]
    fn long_cjk_titles_truncate_on_characters() {
        let title = "中文标题".repeat(40);
        let name = article_filename(Some(&title), "u");
        let stem = name.split("--").next().unwrap();
        assert_eq!(stem.chars().count(), MAX_STEM_CHARS);
    }

    #[test]
    fn reserved_device_names_are_suffixed() {
        assert!(article_filename(Some("con"), "u").starts_with("con_--"));
        assert!(article_filename(Some("LPT3"), "u").starts_with("LPT3_--"));
        assert!(article_filename(Some("COM10"), "u").starts_with("COM10--"));
    }
}
