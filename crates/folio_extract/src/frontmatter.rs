use chrono::SecondsFormat;

use crate::pipeline::ExtractionResult;

/// Markdown document with a YAML front matter block describing `result`.
///
/// String values are emitted as double-quoted scalars; absent metadata is omitted.
pub fn build_markdown_document(url: &str, result: &ExtractionResult) -> String {
    let mut header = String::from("---\n");
    push_field(&mut header, "url", Some(url));
    push_field(&mut header, "title", result.title.as_deref());
    push_field(&mut header, "author", result.author.as_deref());
    push_field(&mut header, "site", result.site_name.as_deref());
    header.push_str(&format!(
        "extracted_utc: {}\nword_count: {}\n---\n\n",
        result
            .extracted_at
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        result.word_count
    ));
    header.push_str(&result.markdown_content);
    header.push('\n');
    header
}

fn push_field(out: &mut String, key: &str, value: Option<&str>) {
    let Some(value) = value else {
        return;
    };
    out.push_str(key);
    out.push_str(": ");
    out.push_str(&quote_scalar(value));
    out.push('\n');
}

/// JSON string syntax is a valid YAML double-quoted scalar.
fn quote_scalar(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value.replace('"', "'")))
}
