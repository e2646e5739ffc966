use folio_extract::{
    count_words, decode_html, Converter, Extractor, MarkdownConverter, ReadabilityExtractor,
};
use pretty_assertions::assert_eq;

const URL: &str = "https://blog.example.com/posts/concurrency";

fn article_markdown(html: &str) -> String {
    let readable = ReadabilityExtractor.extract(html, URL);
    MarkdownConverter.to_markdown(&readable.content_html, readable.base_url.as_deref())
}

#[test]
fn decode_respects_charset_header() {
    let decoded = decode_html(b"caf\xe9", Some("text/html; charset=ISO-8859-1"));
    assert_eq!(decoded.html, "café");
    assert_eq!(decoded.encoding_label, "windows-1252");
}

#[test]
fn decode_handles_utf8_bom() {
    let decoded = decode_html(b"\xEF\xBB\xBFhello", Some("text/html"));
    assert_eq!(decoded.html, "hello");
    assert_eq!(decoded.encoding_label, "UTF-8");
}

#[test]
fn decode_extract_convert_is_deterministic() {
    let bytes = br#"<html><head><title>X</title></head><body><article><p>A</p><p>B</p></article></body></html>"#;
    let decoded = decode_html(bytes, Some("text/html; charset=utf-8"));
    let first = article_markdown(&decoded.html);
    let second = article_markdown(&decoded.html);
    assert_eq!(first, "A\n\nB");
    assert_eq!(first, second);
}

#[test]
fn blog_post_keeps_structure_and_drops_chrome() {
    let html = r#"<!DOCTYPE html>
<html><head>
  <title>Understanding Swift Concurrency - Swift Blog</title>
  <meta property="og:site_name" content="Swift Blog">
</head><body>
  <header><nav><a href="/">Home</a> <a href="/about">About</a></nav></header>
  <div class="sidebar">Popular posts and tag clouds</div>
  <article>
    <h1>Understanding Swift Concurrency</h1>
    <p class="byline">By <span class="author">Jane Developer</span></p>
    <p>Swift concurrency introduces <em>structured</em> tasks and <strong>actors</strong>.
       Read the <a href="/docs/actors">actor guide</a> for details.</p>
    <blockquote><p>Data races are now compile-time errors.</p></blockquote>
    <ul><li>async/await</li><li>Task groups</li></ul>
    <div class="share-buttons"><a href="https://twitter.com/share">Tweet</a></div>
  </article>
  <footer>© Swift Blog</footer>
</body></html>"#;

    let readable = ReadabilityExtractor.extract(html, URL);
    assert_eq!(readable.title.as_deref(), Some("Understanding Swift Concurrency"));
    assert_eq!(readable.author.as_deref(), Some("Jane Developer"));
    assert_eq!(readable.site_name.as_deref(), Some("Swift Blog"));

    let md = MarkdownConverter.to_markdown(&readable.content_html, readable.base_url.as_deref());
    assert!(md.starts_with("# Understanding Swift Concurrency"), "{md}");
    assert!(md.contains("*structured*"));
    assert!(md.contains("**actors**"));
    assert!(md.contains("[actor guide](https://blog.example.com/docs/actors)"));
    assert!(md.contains("> Data races are now compile-time errors."));
    assert!(md.contains("- async/await\n- Task groups"));
    for chrome in ["Home", "Popular posts", "Tweet", "©"] {
        assert!(!md.contains(chrome), "leaked {chrome}: {md}");
    }
    assert!(!md.contains("\n\n\n"));
}

#[test]
fn scored_fallback_finds_prose_without_semantic_markup() {
    let prose = "<p>The quick brown fox jumps over the lazy dog near the riverbank.</p>".repeat(6);
    let links: String = (0..15)
        .map(|i| format!("<a href=\"/tag/{i}\">Tag number {i}</a> "))
        .collect();
    let html = format!(
        "<html><body><div id=\"tags\">{links}</div><div id=\"story\">{prose}</div></body></html>"
    );

    let md = article_markdown(&html);
    assert!(md.starts_with("The quick brown fox"));
    assert!(!md.contains("Tag number"));
}

#[test]
fn chinese_article_counts_each_ideograph() {
    let html = r#"<html><head><meta property="og:title" content="并发编程"></head><body>
        <div class="rich_media_content"><p>Swift并发编程为iOS开发带来了新的可能性。我们在这里讨论它的核心概念和实践方法，以及如何在项目中迁移。这些内容适合所有开发者阅读。</p></div>
    </body></html>"#;

    let readable = ReadabilityExtractor.extract(html, URL);
    assert_eq!(readable.title.as_deref(), Some("并发编程"));
    let md = MarkdownConverter.to_markdown(&readable.content_html, None);
    assert!(md.starts_with("Swift并发编程"));
    // "Swift" and "iOS" are one word each; every ideograph counts alone.
    let ideographs = md.chars().filter(|c| folio_extract::is_cjk(*c)).count();
    assert_eq!(count_words(&md), ideographs + 2);
}
