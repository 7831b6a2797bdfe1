//! Raw record normalization
//!
//! Turns a validated raw record into a canonical `Listing`. The transformer
//! is pure: the same record always produces the same listing, because the
//! reference year is injected instead of read from the clock.

use crate::normalize::{
    abbreviate_street, clean_text, extract_bathrooms, extract_bedrooms, extract_features,
    extract_square_feet, merge_features, parse_price_cents, price_number_to_cents, state_to_code,
    title_case_address, zip5,
};
use crate::record::{Listing, ListingStatus, PropertyType, RawListingRecord};
use serde_json::Value;
use std::collections::BTreeMap;

/// Fields worth 4.3 points each toward the quality score's middle band
const IMPORTANT_FIELDS: &[&str] = &[
    "price",
    "bedrooms",
    "bathrooms",
    "square_feet",
    "street_address",
    "city",
    "state",
];

/// Fields worth 4 points each toward the quality score's detail band
const DETAIL_FIELDS: &[&str] = &["description", "year_built", "lot_size", "images", "features"];

/// Normalizes validated raw records into canonical listings
pub struct Transformer {
    thousands_threshold: i64,
    reference_year: i32,
}

impl Transformer {
    /// Creates a transformer
    ///
    /// # Arguments
    ///
    /// * `thousands_threshold` - Bare sale prices below this are thousands
    /// * `reference_year` - Injected current year, keeps transform pure
    pub fn new(thousands_threshold: i64, reference_year: i32) -> Self {
        Self {
            thousands_threshold,
            reference_year,
        }
    }

    /// Produces a canonical listing from a raw record
    pub fn transform(&self, record: &RawListingRecord) -> Listing {
        let mut listing = Listing::new(
            record.source,
            record.external_id.clone(),
            record.url.clone(),
            record.fetched_at,
        );

        self.transform_text(record, &mut listing);
        self.transform_address(record, &mut listing);
        self.transform_prices(record, &mut listing);
        self.transform_measurements(record, &mut listing);
        self.transform_enums(record, &mut listing);
        self.transform_coordinates(record, &mut listing);
        self.transform_features(record, &mut listing);

        listing.quality_score = quality_score(record);
        listing
    }

    fn transform_text(&self, record: &RawListingRecord, listing: &mut Listing) {
        listing.description = record
            .get_str("description")
            .map(clean_text)
            .filter(|d| !d.is_empty());
    }

    fn transform_address(&self, record: &RawListingRecord, listing: &mut Listing) {
        listing.street_address = record
            .get_str("street_address")
            .map(|s| title_case_address(&abbreviate_street(&clean_text(s))))
            .filter(|s| !s.is_empty());

        listing.city = record
            .get_str("city")
            .map(|s| title_case_address(&clean_text(s)))
            .filter(|s| !s.is_empty());

        // Full state names collapse to codes; already-valid codes pass through
        listing.state = record.get_str("state").and_then(|s| {
            state_to_code(s)
                .map(str::to_string)
                .or_else(|| {
                    let trimmed = s.trim().to_uppercase();
                    (!trimmed.is_empty()).then_some(trimmed)
                })
        });

        listing.zip_code = record.get_str("zip_code").and_then(zip5);
    }

    fn transform_prices(&self, record: &RawListingRecord, listing: &mut Listing) {
        listing.price_cents = self.parse_price(record, "price", false);
        listing.rent_estimate_cents = self.parse_price(record, "rent_estimate", true);
    }

    fn parse_price(&self, record: &RawListingRecord, field: &str, is_rent: bool) -> Option<i64> {
        if let Some(value) = record.get_number(field) {
            return price_number_to_cents(value, self.thousands_threshold, is_rent);
        }
        record
            .get_str(field)
            .and_then(|text| parse_price_cents(text, self.thousands_threshold, is_rent))
    }

    fn transform_measurements(&self, record: &RawListingRecord, listing: &mut Listing) {
        let description = record.get_str("description").unwrap_or("");

        listing.bedrooms = record
            .get_number("bedrooms")
            .map(|v| v as u32)
            .or_else(|| {
                record
                    .get_str("bedrooms")
                    .and_then(extract_bedrooms)
                    .or_else(|| extract_bedrooms(description))
            });

        listing.bathrooms = record.get_number("bathrooms").or_else(|| {
            record
                .get_str("bathrooms")
                .and_then(extract_bathrooms)
                .or_else(|| extract_bathrooms(description))
        });

        listing.square_feet = record
            .get_number("square_feet")
            .map(|v| v as u32)
            .or_else(|| {
                record
                    .get_str("square_feet")
                    .and_then(extract_square_feet)
                    .or_else(|| extract_square_feet(description))
            });

        listing.lot_size = record.get_number("lot_size").filter(|v| *v > 0.0);

        listing.year_built = record
            .get_number("year_built")
            .map(|v| v as i32)
            .filter(|y| *y > 0 && *y <= self.reference_year + 5);
    }

    fn transform_enums(&self, record: &RawListingRecord, listing: &mut Listing) {
        if let Some(label) = record.get_str("property_type") {
            if !label.is_empty() {
                listing.property_type = PropertyType::from_label(label);
            }
        }

        if let Some(label) = record.get_str("listing_status") {
            if let Some(status) = ListingStatus::from_label(label) {
                listing.listing_status = status;
            }
        }
    }

    /// Out-of-range coordinates are dropped rather than carried through
    fn transform_coordinates(&self, record: &RawListingRecord, listing: &mut Listing) {
        listing.latitude = record
            .get_number("latitude")
            .filter(|lat| (-90.0..=90.0).contains(lat));
        listing.longitude = record
            .get_number("longitude")
            .filter(|lon| (-180.0..=180.0).contains(lon));
    }

    fn transform_features(&self, record: &RawListingRecord, listing: &mut Listing) {
        // Source-provided feature flags come first and win over detection
        if let Some(Value::Object(map)) = record.fields.get("features") {
            for (name, value) in map {
                if let Value::Bool(flag) = value {
                    listing.features.insert(name.clone(), *flag);
                }
            }
        }

        if let Some(description) = &listing.description {
            let detected = extract_features(description);
            merge_features(&mut listing.features, detected);
        }

        if let Some(Value::Array(images)) = record.fields.get("images") {
            listing.images = images
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
        }
    }
}

/// Completeness score in [0, 100]
///
/// Band weights: provenance 40, key facts 30, detail fields 20,
/// coordinates 10.
fn quality_score(record: &RawListingRecord) -> f64 {
    let mut score = 0.0;

    if !record.external_id.trim().is_empty() {
        score += 20.0;
    }
    if !record.url.trim().is_empty() {
        score += 20.0;
    }

    let important: f64 = IMPORTANT_FIELDS
        .iter()
        .filter(|f| record.has(f))
        .count() as f64
        * 4.3;
    score += important.min(30.0);

    let detail: f64 = DETAIL_FIELDS.iter().filter(|f| record.has(f)).count() as f64 * 4.0;
    score += detail.min(20.0);

    if record.get_number("latitude").is_some() && record.get_number("longitude").is_some() {
        score += 10.0;
    }

    score.min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SourceId;
    use serde_json::json;

    fn create_test_transformer() -> Transformer {
        Transformer::new(10_000, 2026)
    }

    fn create_test_record() -> RawListingRecord {
        let mut record = RawListingRecord::new(SourceId::Zillow, "z1", "https://example.com/1");
        record.set("street_address", "123 main street");
        record.set("city", "austin");
        record.set("state", "Texas");
        record.set("zip_code", "78701-1234");
        record.set("price", "$450,000");
        record.set("bedrooms", 3);
        record.set("bathrooms", 2.5);
        record.set("square_feet", "1,850 sqft");
        record
    }

    #[test]
    fn test_address_standardization() {
        let listing = create_test_transformer().transform(&create_test_record());
        assert_eq!(listing.street_address.as_deref(), Some("123 Main St"));
        assert_eq!(listing.city.as_deref(), Some("Austin"));
        assert_eq!(listing.state.as_deref(), Some("TX"));
        assert_eq!(listing.zip_code.as_deref(), Some("78701"));
    }

    #[test]
    fn test_price_text_to_cents() {
        let listing = create_test_transformer().transform(&create_test_record());
        assert_eq!(listing.price_cents, Some(45_000_000));
    }

    #[test]
    fn test_rent_range_takes_first_value() {
        let mut record = create_test_record();
        record.fields.remove("price");
        record.set("rent_estimate", "1200-1800 per month");

        let listing = create_test_transformer().transform(&record);
        assert_eq!(listing.rent_estimate_cents, Some(120_000));
        assert_eq!(listing.rent_dollars(), Some(1200.0));
    }

    #[test]
    fn test_measurements_from_text() {
        let listing = create_test_transformer().transform(&create_test_record());
        assert_eq!(listing.bedrooms, Some(3));
        assert_eq!(listing.bathrooms, Some(2.5));
        assert_eq!(listing.square_feet, Some(1850));
    }

    #[test]
    fn test_measurements_fall_back_to_description() {
        let mut record = RawListingRecord::new(SourceId::Redfin, "r1", "https://example.com/2");
        record.set("description", "Bright studio, 1 bath, 600 sqft");

        let listing = create_test_transformer().transform(&record);
        assert_eq!(listing.bedrooms, Some(0));
        assert_eq!(listing.bathrooms, Some(1.0));
        assert_eq!(listing.square_feet, Some(600));
    }

    #[test]
    fn test_property_type_and_status_mapping() {
        let mut record = create_test_record();
        record.set("property_type", "Single Family Home");
        record.set("listing_status", "Price Reduced!");

        let listing = create_test_transformer().transform(&record);
        assert_eq!(listing.property_type, PropertyType::House);
        assert_eq!(listing.listing_status, ListingStatus::PriceReduced);
    }

    #[test]
    fn test_out_of_range_coordinates_dropped() {
        let mut record = create_test_record();
        record.set("latitude", 95.0);
        record.set("longitude", -97.74);

        let listing = create_test_transformer().transform(&record);
        assert_eq!(listing.latitude, None);
        assert_eq!(listing.longitude, Some(-97.74));
    }

    #[test]
    fn test_features_detected_and_merged() {
        let mut record = create_test_record();
        record.set("description", "Home with a pool and granite counters");
        record.set("features", json!({"pool": false, "garage": true}));

        let listing = create_test_transformer().transform(&record);
        // Source said no pool; detection does not override it
        assert_eq!(listing.features.get("pool"), Some(&false));
        assert_eq!(listing.features.get("garage"), Some(&true));
        assert_eq!(listing.features.get("granite"), Some(&true));
    }

    #[test]
    fn test_determinism() {
        let record = create_test_record();
        let transformer = create_test_transformer();
        let a = transformer.transform(&record);
        let b = transformer.transform(&record);
        assert_eq!(a.street_address, b.street_address);
        assert_eq!(a.price_cents, b.price_cents);
        assert_eq!(a.quality_score, b.quality_score);
    }

    #[test]
    fn test_quality_score_rewards_completeness() {
        let full = create_test_transformer().transform(&create_test_record());
        let sparse = create_test_transformer().transform(&RawListingRecord::new(
            SourceId::Zillow,
            "z2",
            "https://example.com/3",
        ));

        assert!(full.quality_score > sparse.quality_score);
        assert!(full.quality_score <= 100.0);
        assert_eq!(sparse.quality_score, 40.0);
    }
}
