//! Free-text cleanup helpers
//!
//! All functions here are pure: the transformer depends on that for
//! reproducible output.

use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Connector words kept lowercase inside title-cased addresses (unless first)
const LOWERCASE_WORDS: &[&str] = &[
    "of", "the", "and", "or", "but", "in", "on", "at", "to", "for", "with",
];

/// Directionals and country codes kept uppercase
const UPPERCASE_WORDS: &[&str] = &["NE", "NW", "SE", "SW", "N", "S", "E", "W", "US", "USA"];

/// Strips markup and collapses all whitespace runs to single spaces
pub fn clean_text(text: &str) -> String {
    let without_tags = TAG_RE.replace_all(text, "");
    WS_RE.replace_all(without_tags.trim(), " ").to_string()
}

/// Title-cases an address, honoring connector and directional exceptions
///
/// "123 main st nw" becomes "123 Main St NW"; "bank of america tower"
/// becomes "Bank of America Tower".
pub fn title_case_address(address: &str) -> String {
    let mut result = Vec::new();

    for (i, word) in address.split_whitespace().enumerate() {
        let upper = word.to_uppercase();
        if UPPERCASE_WORDS.contains(&upper.as_str()) {
            result.push(upper);
            continue;
        }

        let lower = word.to_lowercase();
        if i > 0 && LOWERCASE_WORDS.contains(&lower.as_str()) {
            result.push(lower);
            continue;
        }

        result.push(capitalize(&lower));
    }

    result.join(" ")
}

/// Uppercases the first character of a word
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
