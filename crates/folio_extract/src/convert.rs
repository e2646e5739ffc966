use std::sync::LazyLock;

use ego_tree::NodeRef;
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::dom::{collapse_whitespace, compile_selector, normalized_text, raw_text};

#[allow(clippy::expect_used)]
static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid blank-run regex"));
static CODE: LazyLock<Option<Selector>> = LazyLock::new(|| compile_selector("code"));

const FENCE: &str = "```";
/// Leads every line of a fenced code block until the final cleanup pass, so
/// line normalization and blockquote prefixing never touch code whitespace.
const VERBATIM: char = '\u{E000}';

pub trait Converter: Send + Sync {
    /// Render an HTML fragment as Markdown. Relative link and image targets
    /// are resolved against `base_url` when one is given.
    fn to_markdown(&self, html: &str, base_url: Option<&str>) -> String;
}

/// Recursive-descent HTML to Markdown serializer.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownConverter;

impl Converter for MarkdownConverter {
    fn to_markdown(&self, html: &str, base_url: Option<&str>) -> String {
        if html.trim().is_empty() {
            return String::new();
        }
        let fragment = Html::parse_fragment(html);
        let ctx = ConversionContext {
            base_url: base_url.and_then(|base| Url::parse(base).ok()),
        };
        let raw = ctx.convert_children(*fragment.root_element());
        clean_markdown(&raw)
    }
}

struct ConversionContext {
    base_url: Option<Url>,
}

impl ConversionContext {
    fn convert_children(&self, node: NodeRef<'_, Node>) -> String {
        let mut out = String::new();
        for child in node.children() {
            match child.value() {
                Node::Text(text) => out.push_str(&text.replace('\n', " ")),
                Node::Element(_) => {
                    if let Some(element) = ElementRef::wrap(child) {
                        out.push_str(&self.convert_element(element));
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn convert_element(&self, element: ElementRef<'_>) -> String {
        let tag = element.value().name().to_ascii_lowercase();
        match tag.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = usize::from(tag.as_bytes()[1] - b'0');
                format!("\n\n{} {}\n\n", "#".repeat(level), self.inline(element))
            }
            "p" => {
                let inner = self.inline(element);
                if inner.is_empty() {
                    return String::new();
                }
                format!("\n\n{inner}\n\n")
            }
            "br" => "\n".to_string(),
            "strong" | "b" => self.wrap_inline(element, "**"),
            "em" | "i" => self.wrap_inline(element, "*"),
            "del" | "s" | "strike" => self.wrap_inline(element, "~~"),
            "code" => inline_code(&normalized_text(element)),
            "pre" => convert_pre(element),
            "a" => self.convert_link(element),
            "img" => self.convert_image(element),
            "ul" => self.convert_list(element, false),
            "ol" => self.convert_list(element, true),
            "li" => self.inline(element),
            "blockquote" => self.convert_blockquote(element),
            "hr" => "\n\n---\n\n".to_string(),
            "table" => self.convert_table(element),
            "script" | "style" | "noscript" | "template" | "head" | "title" | "meta" | "link" => {
                // skip scripting, presentation and document-head elements
                String::new()
            }
            _ => self.convert_children(*element),
        }
    }

    /// Children rendered and flattened onto a single line.
    fn inline(&self, element: ElementRef<'_>) -> String {
        collapse_whitespace(&self.convert_children(*element))
    }

    fn wrap_inline(&self, element: ElementRef<'_>, marker: &str) -> String {
        let inner = self.inline(element);
        if inner.is_empty() {
            return String::new();
        }
        format!("{marker}{inner}{marker}")
    }

    fn convert_link(&self, element: ElementRef<'_>) -> String {
        let text = self.inline(element);
        if text.is_empty() {
            return String::new();
        }
        let href = element.value().attr("href").map(str::trim).unwrap_or_default();
        match self.resolve_target(href) {
            Some(target) => format!("[{text}]({target})"),
            None => text,
        }
    }

    fn convert_image(&self, element: ElementRef<'_>) -> String {
        let src = element.value().attr("src").map(str::trim).unwrap_or_default();
        let Some(target) = self.resolve_target(src) else {
            return String::new();
        };
        let alt = collapse_whitespace(element.value().attr("alt").unwrap_or_default());
        format!("\n\n![{alt}]({target})\n\n")
    }

    /// Absolute and fragment-only targets are kept as written; relative ones
    /// are joined onto the base URL. Empty and `javascript:` targets yield `None`.
    fn resolve_target(&self, reference: &str) -> Option<String> {
        if reference.is_empty() || reference.to_ascii_lowercase().starts_with("javascript:") {
            return None;
        }
        if reference.starts_with('#') || Url::parse(reference).is_ok() {
            return Some(reference.to_string());
        }
        match &self.base_url {
            Some(base) => Some(
                base.join(reference)
                    .map(String::from)
                    .unwrap_or_else(|_| reference.to_string()),
            ),
            None => Some(reference.to_string()),
        }
    }

    fn convert_list(&self, element: ElementRef<'_>, ordered: bool) -> String {
        let items: Vec<String> = child_elements(element, &["li"])
            .map(|item| self.inline(item))
            .collect();
        if items.is_empty() {
            return String::new();
        }

        let mut out = String::from("\n\n");
        for (index, item) in items.iter().enumerate() {
            if ordered {
                out.push_str(&format!("{}. {item}\n", index + 1));
            } else {
                out.push_str(&format!("- {item}\n"));
            }
        }
        out.push('\n');
        out
    }

    fn convert_blockquote(&self, element: ElementRef<'_>) -> String {
        let inner = self.convert_children(*element);
        let inner = BLANK_RUNS.replace_all(inner.trim(), "\n\n");
        if inner.is_empty() {
            return String::new();
        }
        let quoted = inner
            .lines()
            .map(|line| match line.strip_prefix(VERBATIM) {
                Some(code) => format!("{VERBATIM}> {code}"),
                None => format!("> {}", line.trim()),
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!("\n\n{quoted}\n\n")
    }

    fn convert_table(&self, element: ElementRef<'_>) -> String {
        let mut rows: Vec<Vec<String>> = Vec::new();

        if let Some(header) = child_elements(element, &["thead"])
            .flat_map(|thead| child_elements(thead, &["tr"]))
            .next()
        {
            rows.push(self.table_cells(header));
        }

        for child in child_elements(element, &["tbody", "tfoot", "tr"]) {
            if child.value().name() == "tr" {
                rows.push(self.table_cells(child));
            } else {
                rows.extend(child_elements(child, &["tr"]).map(|tr| self.table_cells(tr)));
            }
        }

        rows.retain(|row| !row.is_empty());
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return String::new();
        }
        for row in &mut rows {
            row.resize(columns, String::new());
        }

        let mut out = String::from("\n\n");
        // Markdown tables need a header; without <thead> the first row takes that role.
        out.push_str(&table_row(&rows[0]));
        out.push_str(&table_row(&vec!["---".to_string(); columns]));
        for row in &rows[1..] {
            out.push_str(&table_row(row));
        }
        out.push('\n');
        out
    }

    fn table_cells(&self, row: ElementRef<'_>) -> Vec<String> {
        child_elements(row, &["th", "td"])
            .map(|cell| self.inline(cell).replace('|', "\\|"))
            .collect()
    }
}

fn child_elements<'a>(
    element: ElementRef<'a>,
    names: &'a [&'a str],
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| names.contains(&child.value().name()))
}

fn table_row(cells: &[String]) -> String {
    format!("| {} |\n", cells.join(" | "))
}

fn inline_code(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    if text.contains('`') {
        format!("`` {text} ``")
    } else {
        format!("`{text}`")
    }
}

fn convert_pre(element: ElementRef<'_>) -> String {
    let code = CODE
        .as_ref()
        .and_then(|selector| element.select(selector).next());
    let target = code.unwrap_or(element);
    let language = code_language(target.value().attr("class").unwrap_or_default());
    let body = raw_text(target).replace(VERBATIM, "");

    let mut out = format!("\n\n{VERBATIM}{FENCE}{language}\n");
    for line in body.split('\n') {
        out.push(VERBATIM);
        out.push_str(line);
        out.push('\n');
    }
    out.push(VERBATIM);
    out.push_str(FENCE);
    out.push_str("\n\n");
    out
}

/// Language named by a `language-xxx` class, else a `lang-xxx` class.
fn code_language(class: &str) -> String {
    ["language-", "lang-"]
        .iter()
        .find_map(|prefix| {
            class.split_whitespace().find_map(|token| {
                let name: String = token
                    .strip_prefix(prefix)?
                    .chars()
                    .take_while(|c| c.is_alphanumeric() || *c == '_')
                    .collect();
                (!name.is_empty()).then_some(name)
            })
        })
        .unwrap_or_default()
}

/// Trim prose lines, collapse blank runs and trim the document.
///
/// Code lines keep their marker while blank runs are collapsed, so empty
/// lines inside a fence survive; markers left mid-line by inline flattening
/// are dropped with the rest.
fn clean_markdown(text: &str) -> String {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| if line.starts_with(VERBATIM) { line } else { line.trim() })
        .collect();
    BLANK_RUNS
        .replace_all(&lines.join("\n"), "\n\n")
        .replace(VERBATIM, "")
        .trim()
        .to_string()
}
