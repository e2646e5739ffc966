use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use folio_logging::folio_debug;
use regex::bytes::Regex;

/// Only the head of the document is scanned for a `<meta charset>` declaration.
pub const META_SCAN_BYTES: usize = 4096;

#[allow(clippy::expect_used)]
static META_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i-u)charset\s*=\s*["']?([^"';\s>/]+)"#).expect("valid charset regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHtml {
    pub html: String,
    pub encoding_label: String,
}

/// Decode raw bytes into UTF-8 using: Content-Type charset -> UTF-8 -> meta charset -> windows-1252.
///
/// The header charset wins over a conflicting `<meta charset>` even when the
/// header is wrong, as long as the bytes decode cleanly with it. The final
/// single-byte step maps every byte and cannot fail.
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> DecodedHtml {
    // 1) Content-Type header charset
    let header_label = content_type.and_then(extract_charset);
    if let Some(enc) = header_label.as_deref().and_then(encoding_for) {
        if let Some(decoded) = decode_strict(bytes, enc) {
            return decoded;
        }
        folio_debug!("decode_header_charset_failed encoding={}", enc.name());
    }

    // 2) Plain UTF-8
    if let Some(decoded) = decode_strict(bytes, UTF_8) {
        return decoded;
    }

    // 3) <meta charset> in the document head
    if let Some(enc) = meta_charset(bytes).and_then(|label| encoding_for(&label)) {
        if let Some(decoded) = decode_strict(bytes, enc) {
            return decoded;
        }
        folio_debug!("decode_meta_charset_failed encoding={}", enc.name());
    }

    // 4) Single-byte fallback, total over all inputs
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    DecodedHtml {
        html: text.into_owned(),
        encoding_label: WINDOWS_1252.name().to_string(),
    }
}

/// Pull the `charset=` parameter out of a Content-Type header value.
pub fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| {
            let part = part.trim();
            let (key, value) = part.split_once('=')?;
            if !key.trim().eq_ignore_ascii_case("charset") {
                return None;
            }
            Some(value.trim().trim_matches(['"', '\''].as_ref()).to_string())
        })
        .find(|label| !label.is_empty())
}

/// Find a charset declared in the first [`META_SCAN_BYTES`] bytes of the document.
pub fn meta_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(META_SCAN_BYTES)];
    META_CHARSET_RE
        .captures(head)
        .and_then(|caps| caps.get(1))
        .map(|m| String::from_utf8_lossy(m.as_bytes()).to_ascii_lowercase())
}

fn encoding_for(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
}

fn decode_strict(bytes: &[u8], enc: &'static Encoding) -> Option<DecodedHtml> {
    let (text, had_errors) = enc.decode_with_bom_removal(bytes);
    if had_errors {
        return None;
    }
    Some(DecodedHtml {
        html: text.into_owned(),
        encoding_label: enc.name().to_string(),
    })
}
