//! Ordered pattern tables for pulling measurements out of free text
//!
//! Each field has a fixed, ordered rule list; the first matching rule wins.
//! New portals with odd phrasings extend the tables, not the code.

use regex::Regex;
use std::sync::LazyLock;

static BED_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(\d+)\s*(?:bedrooms?|beds?|bds?\b|br\b)").expect("valid regex"),
        Regex::new(r"(\d+)br").expect("valid regex"),
    ]
});

static BATH_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(\d+(?:\.\d+)?)\s*(?:bathrooms?|baths?|ba\b)").expect("valid regex"),
        Regex::new(r"(\d+(?:\.\d+)?)ba").expect("valid regex"),
    ]
});

static SQFT_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"([\d,]+(?:\.\d+)?)\s*(?:sq\.?\s*ft\.?|sqft|square\s*feet)")
            .expect("valid regex"),
        Regex::new(r"([\d,]+(?:\.\d+)?)\s*sf\b").expect("valid regex"),
    ]
});

/// Extracts a bedroom count from description text
///
/// "studio" anywhere in the text means zero bedrooms and takes precedence
/// over the numbered patterns.
pub fn extract_bedrooms(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();

    if lower.contains("studio") {
        return Some(0);
    }

    first_capture(&BED_RULES, &lower)?.parse().ok()
}

/// Extracts a bathroom count (may be fractional, e.g. 2.5)
pub fn extract_bathrooms(text: &str) -> Option<f64> {
    let lower = text.to_lowercase();
    first_capture(&BATH_RULES, &lower)?.parse().ok()
}

/// Extracts square footage from description text
pub fn extract_square_feet(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    let captured = first_capture(&SQFT_RULES, &lower)?.replace(',', "");
    captured.parse::<f64>().ok().map(|v| v as u32)
}

/// Runs the ordered rule list, returning the first rule's first capture
fn first_capture(rules: &[Regex], text: &str) -> Option<String> {
    for rule in rules {
        if let Some(caps) = rule.captures(text) {
            if let Some(m) = caps.get(1) {
                return Some(m.as_str().to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bedrooms_variants() {
        assert_eq!(extract_bedrooms("Cozy 3 bed home"), Some(3));
        assert_eq!(extract_bedrooms("4 bedroom colonial"), Some(4));
        assert_eq!(extract_bedrooms("2br walkup"), Some(2));
        assert_eq!(extract_bedrooms("3 bd / 2 ba"), Some(3));
        assert_eq!(extract_bedrooms("3 bds, 2 ba, 1,800 sqft"), Some(3));
    }

    #[test]
    fn test_studio_means_zero_bedrooms() {
        assert_eq!(extract_bedrooms("Bright studio near downtown"), Some(0));
        // Studio wins even when a number appears later
        assert_eq!(extract_bedrooms("studio with 1 bath"), Some(0));
    }

    #[test]
    fn test_extract_bathrooms_fractional() {
        assert_eq!(extract_bathrooms("3 bed 2.5 bath"), Some(2.5));
        assert_eq!(extract_bathrooms("1ba unit"), Some(1.0));
    }

    #[test]
    fn test_extract_square_feet_variants() {
        assert_eq!(extract_square_feet("1,850 sqft of living space"), Some(1850));
        assert_eq!(extract_square_feet("approx 900 sq ft"), Some(900));
        assert_eq!(extract_square_feet("2000 sf ranch"), Some(2000));
    }

    #[test]
    fn test_no_match_returns_none() {
        assert_eq!(extract_bedrooms("charming bungalow"), None);
        assert_eq!(extract_bathrooms("charming bungalow"), None);
        assert_eq!(extract_square_feet("charming bungalow"), None);
    }

    #[test]
    fn test_first_rule_wins() {
        // Both the long and short sqft forms appear; the ordered table picks
        // the long form's number
        assert_eq!(extract_square_feet("1200 square feet (1300 sf)"), Some(1200));
    }
}
