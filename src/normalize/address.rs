//! Address component canonicalization
//!
//! State names collapse to USPS codes, zip codes to their first five digits,
//! and street-type words to standard abbreviations via fixed tables.

use regex::Regex;
use std::sync::LazyLock;

static ZIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{5}").expect("valid regex"));

/// Full state name (uppercase) to USPS code
const STATE_TABLE: &[(&str, &str)] = &[
    ("ALABAMA", "AL"),
    ("ALASKA", "AK"),
    ("ARIZONA", "AZ"),
    ("ARKANSAS", "AR"),
    ("CALIFORNIA", "CA"),
    ("COLORADO", "CO"),
    ("CONNECTICUT", "CT"),
    ("DELAWARE", "DE"),
    ("FLORIDA", "FL"),
    ("GEORGIA", "GA"),
    ("HAWAII", "HI"),
    ("IDAHO", "ID"),
    ("ILLINOIS", "IL"),
    ("INDIANA", "IN"),
    ("IOWA", "IA"),
    ("KANSAS", "KS"),
    ("KENTUCKY", "KY"),
    ("LOUISIANA", "LA"),
    ("MAINE", "ME"),
    ("MARYLAND", "MD"),
    ("MASSACHUSETTS", "MA"),
    ("MICHIGAN", "MI"),
    ("MINNESOTA", "MN"),
    ("MISSISSIPPI", "MS"),
    ("MISSOURI", "MO"),
    ("MONTANA", "MT"),
    ("NEBRASKA", "NE"),
    ("NEVADA", "NV"),
    ("NEW HAMPSHIRE", "NH"),
    ("NEW JERSEY", "NJ"),
    ("NEW MEXICO", "NM"),
    ("NEW YORK", "NY"),
    ("NORTH CAROLINA", "NC"),
    ("NORTH DAKOTA", "ND"),
    ("OHIO", "OH"),
    ("OKLAHOMA", "OK"),
    ("OREGON", "OR"),
    ("PENNSYLVANIA", "PA"),
    ("RHODE ISLAND", "RI"),
    ("SOUTH CAROLINA", "SC"),
    ("SOUTH DAKOTA", "SD"),
    ("TENNESSEE", "TN"),
    ("TEXAS", "TX"),
    ("UTAH", "UT"),
    ("VERMONT", "VT"),
    ("VIRGINIA", "VA"),
    ("WASHINGTON", "WA"),
    ("WEST VIRGINIA", "WV"),
    ("WISCONSIN", "WI"),
    ("WYOMING", "WY"),
];

/// Street-type word (lowercase) to standard abbreviation
const STREET_ABBREVIATIONS: &[(&str, &str)] = &[
    ("street", "St"),
    ("avenue", "Ave"),
    ("boulevard", "Blvd"),
    ("drive", "Dr"),
    ("road", "Rd"),
    ("lane", "Ln"),
    ("circle", "Cir"),
    ("court", "Ct"),
    ("place", "Pl"),
    ("terrace", "Ter"),
    ("parkway", "Pkwy"),
    ("north", "N"),
    ("south", "S"),
    ("east", "E"),
    ("west", "W"),
    ("northeast", "NE"),
    ("northwest", "NW"),
    ("southeast", "SE"),
    ("southwest", "SW"),
];

/// Resolves a state to its USPS code
///
/// Accepts either a two-letter code (any case) or a full state name.
/// Returns None for anything unrecognized.
pub fn state_to_code(state: &str) -> Option<&'static str> {
    let upper = state.trim().to_uppercase();

    if upper.len() == 2 {
        return STATE_TABLE
            .iter()
            .find(|(_, code)| *code == upper)
            .map(|(_, code)| *code);
    }

    STATE_TABLE
        .iter()
        .find(|(name, _)| *name == upper)
        .map(|(_, code)| *code)
}

/// Returns true if the value is a known state code or full name
pub fn is_valid_state(state: &str) -> bool {
    state_to_code(state).is_some()
}

/// Extracts the first five-digit group from zip text
pub fn zip5(zip: &str) -> Option<String> {
    ZIP_RE.find(zip).map(|m| m.as_str().to_string())
}

/// Abbreviates street-type and directional words using the fixed table
///
/// Matching is per-word and case-insensitive; unknown words pass through
/// unchanged.
pub fn abbreviate_street(address: &str) -> String {
    address
        .split_whitespace()
        .map(|word| {
            let key = word.to_lowercase();
            STREET_ABBREVIATIONS
                .iter()
                .find(|(full, _)| *full == key)
                .map(|(_, abbr)| abbr.to_string())
                .unwrap_or_else(|| word.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_full_name_resolves() {
        assert_eq!(state_to_code("Texas"), Some("TX"));
        assert_eq!(state_to_code("new york"), Some("NY"));
        assert_eq!(state_to_code("WEST VIRGINIA"), Some("WV"));
    }

    #[test]
    fn test_state_code_passthrough() {
        assert_eq!(state_to_code("tx"), Some("TX"));
        assert_eq!(state_to_code("CA"), Some("CA"));
    }

    #[test]
    fn test_unknown_state_rejected() {
        assert_eq!(state_to_code("ZZ"), None);
        assert_eq!(state_to_code("Atlantis"), None);
        assert!(!is_valid_state("XX"));
        assert!(is_valid_state("Ohio"));
    }

    #[test]
    fn test_zip5_extraction() {
        assert_eq!(zip5("78701-1234"), Some("78701".to_string()));
        assert_eq!(zip5("TX 78701"), Some("78701".to_string()));
        assert_eq!(zip5("no digits"), None);
    }

    #[test]
    fn test_abbreviate_street() {
        assert_eq!(abbreviate_street("123 Main Street"), "123 Main St");
        assert_eq!(
            abbreviate_street("456 Oak Avenue Northwest"),
            "456 Oak Ave NW"
        );
        assert_eq!(abbreviate_street("789 Elm Dr"), "789 Elm Dr");
    }

    #[test]
    fn test_abbreviate_street_case_insensitive() {
        assert_eq!(abbreviate_street("123 MAIN STREET"), "123 MAIN St");
    }
}
