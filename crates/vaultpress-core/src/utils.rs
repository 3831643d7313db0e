//! Shared text and URL helpers used across vaultpress crates.
//!
//! Provides:
//! - Slugification shared by heading ids and link anchors
//! - Fail-soft percent decoding
//! - `/index` normalization for folder-based content
//! - Date parsing/formatting and HTML escaping

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Canonicalize text into a lowercase, hyphen-separated identifier.
///
/// Lowercases ASCII, drops everything outside `[a-z0-9\s-]`, turns runs of
/// whitespace and hyphens into a single `-` and trims hyphens at both ends.
/// Used identically for heading ids and link anchors.
///
/// ```
/// use vaultpress_core::utils::slugify;
///
/// assert_eq!(slugify("Choose Your Workflow!"), "choose-your-workflow");
/// assert_eq!(slugify("  --Hello   World--  "), "hello-world");
/// ```
pub fn slugify(text: &str) -> String {
    let kept: String = text
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();

    kept.split(|c: char| c.is_whitespace() || c == '-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Percent-decode text, returning the input unchanged when decoding fails.
pub fn decode_uri_component(text: &str) -> String {
    match urlencoding::decode(text) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => text.to_string(),
    }
}

/// Percent-encode a URL component
pub fn encode_uri_component(text: &str) -> String {
    urlencoding::encode(text).into_owned()
}

/// Remove every trailing `/index` from a URL path, keeping any fragment.
///
/// A path that collapses to nothing becomes `/`. Applying this twice gives
/// the same result as applying it once.
///
/// ```
/// use vaultpress_core::utils::normalize_index;
///
/// assert_eq!(normalize_index("/posts/trip/index#day-1"), "/posts/trip#day-1");
/// assert_eq!(normalize_index("/index"), "/");
/// assert_eq!(normalize_index("#top"), "#top");
/// ```
pub fn normalize_index(url: &str) -> String {
    let (path, fragment) = match url.find('#') {
        Some(i) => (&url[..i], &url[i..]),
        None => (url, ""),
    };

    let mut trimmed = path
        .strip_suffix('/')
        .filter(|p| p.ends_with("/index"))
        .unwrap_or(path);
    while let Some(rest) = trimmed.strip_suffix("/index") {
        trimmed = rest;
    }

    let trimmed = if trimmed.is_empty() && !path.is_empty() {
        "/"
    } else {
        trimmed
    };
    format!("{}{}", trimmed, fragment)
}

/// Drop `/index` from a two-segment folder path (`slug/index` -> `slug`).
///
/// Deeper paths are returned unchanged.
pub fn strip_folder_index(path: &str) -> &str {
    match path.strip_suffix("/index") {
        Some(folder) if path.split('/').count() == 2 => folder,
        _ => path,
    }
}

/// Parse the date formats found in frontmatter and content APIs
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Short numeric date (`3/14/2024`)
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Largest char boundary at or below `index`
pub fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut i = index.min(text.len());
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Smallest char boundary at or above `index`
pub fn ceil_char_boundary(text: &str, index: usize) -> usize {
    let mut i = index.min(text.len());
    while !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Compact JSON serialization with consistent error context
pub fn to_json_string<T: serde::Serialize + ?Sized>(data: &T, context: &str) -> Result<String> {
    serde_json::to_string(data)
        .map_err(|e| Error::other(format!("Failed to serialize {} as JSON: {}", context, e)))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn slugify_is_idempotent(text in "\\PC{0,40}") {
            let once = slugify(&text);
            prop_assert_eq!(slugify(&once), once);
        }

        #[test]
        fn slugify_survives_percent_round_trip(text in "[A-Za-z0-9 ._~-]{0,40}") {
            let encoded = encode_uri_component(&text);
            prop_assert_eq!(slugify(&decode_uri_component(&encoded)), slugify(&text));
        }

        #[test]
        fn normalize_index_is_idempotent(path in "(/[a-z]{1,6}){0,3}(/index){0,2}/?") {
            let once = normalize_index(&path);
            prop_assert_eq!(normalize_index(&once), once);
        }
    }
}
