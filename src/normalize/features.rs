//! Amenity detection from description text
//!
//! A fixed keyword-family table maps description phrases to canonical feature
//! flags. Detection only ever sets flags to true; absence of a keyword says
//! nothing, so missing features stay unset rather than false.

use std::collections::BTreeMap;

/// Canonical feature name to the description keywords that imply it
const FEATURE_KEYWORDS: &[(&str, &[&str])] = &[
    ("pool", &["pool", "swimming"]),
    ("garage", &["garage", "carport"]),
    ("fireplace", &["fireplace"]),
    ("basement", &["basement"]),
    ("balcony", &["balcony", "terrace", "patio"]),
    ("hardwood_floors", &["hardwood"]),
    ("stainless_steel", &["stainless"]),
    ("granite", &["granite"]),
    ("washer_dryer", &["washer", "dryer", "laundry"]),
    ("dishwasher", &["dishwasher"]),
    ("air_conditioning", &["air conditioning", "a/c", "central air"]),
    ("heating", &["heating", "furnace"]),
    ("walk_in_closet", &["walk-in closet", "walk in closet"]),
    ("updated_kitchen", &["updated kitchen", "renovated kitchen", "new kitchen"]),
    ("pet_friendly", &["pet friendly", "pets allowed", "dog friendly", "cat friendly"]),
    ("furnished", &["furnished"]),
    ("gym", &["gym", "fitness"]),
    ("elevator", &["elevator"]),
];

/// Scans description text for feature keywords
///
/// Returns a map containing only the features that were detected, each set
/// to true.
pub fn extract_features(text: &str) -> BTreeMap<String, bool> {
    let lower = text.to_lowercase();
    let mut features = BTreeMap::new();

    for (name, keywords) in FEATURE_KEYWORDS {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            features.insert((*name).to_string(), true);
        }
    }

    features
}

/// Folds detected features into an existing map; existing entries win
pub fn merge_features(existing: &mut BTreeMap<String, bool>, detected: BTreeMap<String, bool>) {
    for (name, value) in detected {
        existing.entry(name).or_insert(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_features_from_description() {
        let features =
            extract_features("Stunning home with a swimming pool, two-car garage, and granite counters");
        assert_eq!(features.get("pool"), Some(&true));
        assert_eq!(features.get("garage"), Some(&true));
        assert_eq!(features.get("granite"), Some(&true));
        assert_eq!(features.get("elevator"), None);
    }

    #[test]
    fn test_extract_features_multiword_keywords() {
        let features = extract_features("Central air and a walk-in closet");
        assert_eq!(features.get("air_conditioning"), Some(&true));
        assert_eq!(features.get("walk_in_closet"), Some(&true));
    }

    #[test]
    fn test_extract_features_empty_text() {
        assert!(extract_features("").is_empty());
    }

    #[test]
    fn test_merge_keeps_existing_values() {
        let mut existing = BTreeMap::new();
        existing.insert("pool".to_string(), false);

        let mut detected = BTreeMap::new();
        detected.insert("pool".to_string(), true);
        detected.insert("gym".to_string(), true);

        merge_features(&mut existing, detected);
        // Source-provided false survives keyword detection
        assert_eq!(existing.get("pool"), Some(&false));
        assert_eq!(existing.get("gym"), Some(&true));
    }
}
