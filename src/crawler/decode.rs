//! Charset-aware decoding of fetched HTML
//!
//! The charset is taken from the `Content-Type` header when present, then
//! from a `<meta>` declaration found in the raw bytes. Labels are resolved
//! through the WHATWG encoding table. Malformed sequences become U+FFFD in
//! the resolved encoding; only an unknown or missing charset falls back to
//! UTF-8.

use encoding_rs::Encoding;
use regex::bytes::Regex as BytesRegex;
use regex::Regex;
use std::sync::LazyLock;

static HEADER_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"charset=([^\s;]+)").expect("valid charset regex"));

/// `<meta charset="...">`
static META_CHARSET: LazyLock<BytesRegex> = LazyLock::new(|| {
    BytesRegex::new(r#"(?i)<meta[^>]+charset=["']?([^"'\s>]+)"#).expect("valid meta regex")
});

/// `<meta http-equiv="Content-Type" content="...; charset=...">`
static META_HTTP_EQUIV: LazyLock<BytesRegex> = LazyLock::new(|| {
    BytesRegex::new(
        r#"(?i)<meta[^>]+http-equiv=["']?Content-Type["']?[^>]+content=["']?[^"']*charset=([^"'\s;>]+)"#,
    )
    .expect("valid meta regex")
});

/// Same as above with `content` before `http-equiv`
static META_CONTENT_FIRST: LazyLock<BytesRegex> = LazyLock::new(|| {
    BytesRegex::new(
        r#"(?i)<meta[^>]+content=["']?[^"']*charset=([^"'\s;>]+)[^>]+http-equiv=["']?Content-Type["']?"#,
    )
    .expect("valid meta regex")
});

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decodes an HTML body to a `String`
///
/// # Arguments
///
/// * `body` - Raw response bytes
/// * `content_type` - The `Content-Type` header value (may be empty)
///
/// # Returns
///
/// The decoded text. Valid UTF-8 input with no declared charset comes back
/// unchanged.
pub fn decode_html(body: &[u8], content_type: &str) -> String {
    if let Some(encoding) = encoding_from_content_type(content_type) {
        return decode_with(body, encoding);
    }

    if let Some(encoding) = encoding_from_meta(body) {
        return decode_with(body, encoding);
    }

    String::from_utf8_lossy(body).into_owned()
}

fn encoding_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    if content_type.is_empty() {
        return None;
    }

    let caps = HEADER_CHARSET.captures(content_type)?;
    let label = caps[1].trim_matches(|c| c == '"' || c == '\'');
    Encoding::for_label(label.as_bytes())
}

fn encoding_from_meta(body: &[u8]) -> Option<&'static Encoding> {
    if body.starts_with(UTF8_BOM) {
        return None;
    }

    [&*META_CHARSET, &*META_HTTP_EQUIV, &*META_CONTENT_FIRST]
        .into_iter()
        .find_map(|re| {
            let caps = re.captures(body)?;
            Encoding::for_label(&caps[1])
        })
}

fn decode_with(body: &[u8], encoding: &'static Encoding) -> String {
    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        tracing::debug!(
            "Malformed {} sequences replaced with U+FFFD",
            encoding.name()
        );
    }
    text.into_owned()
}
