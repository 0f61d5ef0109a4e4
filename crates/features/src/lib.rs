//! Feature extraction for studio listings.
//!
//! Provides pure functions that turn loosely-typed catalog records into
//! something the filter and ranking stages can rely on:
//! - Field resolution and normalization (`normalize`)
//! - Service capability classification (`signals`)
//! - Text helpers shared by both (number extraction, slugs, haystacks)

pub mod normalize;
pub mod signals;

pub use normalize::{normalize, normalize_batch, normalize_from, normalize_unit, FieldResolver};
pub use signals::{annotate, classify, matched_keywords, ConfigError, SignalRule, SignalRules};

/// Extract a number the way a price field is read: every character that is not
/// a digit or `.` is dropped, then the longest leading decimal is parsed.
///
/// `"$1,250.50 / sq ft"` reads as `1250.5`. Returns `None` when nothing numeric
/// is left.
pub fn parse_permissive_number(text: &str) -> Option<f64> {
    let stripped: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    parse_leading_number(&stripped)
}

/// Parse the longest leading decimal of a trimmed string (`"4.5 stars"` → 4.5).
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (idx, c) in text.char_indices() {
        match c {
            '-' | '+' if idx == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = idx + c.len_utf8();
    }

    if !seen_digit {
        return None;
    }

    text[..end]
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Lowercase, trimmed copy of a text fragment.
pub fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

/// URL-friendly slug: lowercase alphanumerics joined by single dashes.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Lowercase every non-empty fragment; the result is a haystack of parts.
pub fn lowercase_parts<'a>(parts: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Case-insensitive substring test of `needle` against any haystack part.
///
/// Parts are expected to be lowercase already (see `lowercase_parts`).
pub fn any_part_contains(parts: &[String], needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }
    parts.iter().any(|part| part.contains(&needle))
}
