//! Parsing of human-formatted counters and labels.

use std::sync::LazyLock;

use regex::Regex;

static SCALED_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:,\d+)*(?:\.\d+)?)([KkMm])?").expect("valid scaled-number regex")
});
static FIRST_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid digit-run regex"));
static LEADING_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})").expect("valid leading-year regex"));
static PAREN_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+)\)").expect("valid parenthesized-count regex"));
static TRAILING_PAREN_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(\d+\)\s*$").expect("valid trailing-count regex"));

/// Parses counters such as `"1.2K"`, `"3,401"`, `"$5"` or `"2M"`.
///
/// The first number in the text is used; thousands separators are dropped
/// and surrounding words or currency signs are ignored. A K or M directly
/// after the digits multiplies by 1,000 or 1,000,000, unless it starts a
/// word as in `"3months"`.
/// Returns `None` when there is no number or it has more than one decimal
/// point.
#[must_use]
pub fn parse_scaled_number(text: &str) -> Option<f64> {
    let caps = SCALED_NUMBER.captures(text)?;
    let rest = &text[caps.get(0)?.end()..];
    if rest
        .strip_prefix('.')
        .is_some_and(|r| r.starts_with(|c: char| c.is_ascii_digit()))
    {
        return None;
    }

    let multiplier = match caps.get(2).map(|m| m.as_str()) {
        Some(_) if rest.starts_with(char::is_alphabetic) => 1.0,
        Some("k" | "K") => 1_000.0,
        Some(_) => 1_000_000.0,
        None => 1.0,
    };
    let digits = caps.get(1)?.as_str().replace(',', "");
    digits.parse::<f64>().ok().map(|v| v * multiplier)
}

/// Same as [`parse_scaled_number`] but rounded to a non-negative count.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_scaled_count(text: &str) -> Option<u64> {
    parse_scaled_number(text)
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u64)
}

/// First maximal run of digits, or 0 when there is none.
#[must_use]
pub fn extract_first_integer(text: &str) -> u64 {
    FIRST_DIGITS
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Parses `"2023 (42)"` style labels into `("2023", 42)`.
///
/// Both the leading four-digit year and a parenthesized count are required.
#[must_use]
pub fn parse_labeled_count(text: &str) -> Option<(String, u64)> {
    let text = text.trim();
    let year = LEADING_YEAR.captures(text)?.get(1)?.as_str().to_string();
    let count = parse_parenthesized_count(text)?;
    Some((year, count))
}

/// The first `(n)` in the text.
#[must_use]
pub fn parse_parenthesized_count(text: &str) -> Option<u64> {
    PAREN_COUNT
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Splits `"Gold Tier (12)"` into `("gold_tier", 12)`.
///
/// A missing count reads as 0; a missing name becomes `unknown_tier`.
#[must_use]
pub fn parse_tier_label(text: &str) -> (String, u64) {
    let text = text.trim();
    let count = parse_parenthesized_count(text).unwrap_or(0);
    let name = TRAILING_PAREN_COUNT
        .replace(text, "")
        .trim()
        .to_lowercase()
        .replace(' ', "_");
    if name.is_empty() {
        ("unknown_tier".to_string(), count)
    } else {
        (name, count)
    }
}

/// Member blocks hold the number in its own node, e.g. `"1,204"`.
#[must_use]
pub fn parse_member_number(text: &str) -> Option<u64> {
    let cleaned = text.trim().replace(',', "");
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse().ok()
}

#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[must_use]
pub fn has_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
