//! Record validation
//!
//! Runs every raw record through the full check list and reports all
//! problems at once; a record with five bad fields gets five diagnostics,
//! not one. Checks run in a fixed order: required fields, numeric ranges,
//! enum membership, address shape, then cross-field rules.

use crate::config::ValidationConfig;
use crate::normalize::{is_valid_state, parse_price_cents, zip5};
use crate::record::{ListingStatus, RawListingRecord};

/// One problem found in one field
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Field the problem was found in
    pub field: String,
    /// Human-readable description
    pub message: String,
}

impl Diagnostic {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// The accumulated result of validating one record
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    /// Every problem found; empty means the record is valid
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Validates raw records against configured ranges and business rules
pub struct Validator {
    config: ValidationConfig,
    /// Bare prices below this are read as thousands of dollars
    thousands_threshold: i64,
    /// Year used for "not in the future" checks, injected for determinism
    reference_year: i32,
}

impl Validator {
    /// Creates a validator
    ///
    /// # Arguments
    ///
    /// * `config` - Range tables to validate against
    /// * `thousands_threshold` - Matches the transformer's price heuristic so
    ///   both stages read price text the same way
    /// * `reference_year` - Current year for year-built checks
    pub fn new(config: ValidationConfig, thousands_threshold: i64, reference_year: i32) -> Self {
        Self {
            config,
            thousands_threshold,
            reference_year,
        }
    }

    /// Runs the full check list against one record
    pub fn validate(&self, record: &RawListingRecord) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::default();

        self.check_required(record, &mut outcome);
        self.check_ranges(record, &mut outcome);
        self.check_enums(record, &mut outcome);
        self.check_address(record, &mut outcome);
        self.check_cross_field(record, &mut outcome);

        outcome
    }

    fn check_required(&self, record: &RawListingRecord, outcome: &mut ValidationOutcome) {
        if record.external_id.trim().is_empty() {
            outcome
                .diagnostics
                .push(Diagnostic::new("external_id", "required field is empty"));
        }
        if record.url.trim().is_empty() {
            outcome
                .diagnostics
                .push(Diagnostic::new("url", "required field is empty"));
        }
    }

    fn check_ranges(&self, record: &RawListingRecord, outcome: &mut ValidationOutcome) {
        self.check_price_field(record, outcome, "price", false);
        self.check_price_field(record, outcome, "rent_estimate", true);

        self.check_numeric_range(
            record,
            outcome,
            "bedrooms",
            0.0,
            self.config.max_bedrooms as f64,
        );
        self.check_numeric_range(
            record,
            outcome,
            "bathrooms",
            0.0,
            self.config.max_bathrooms as f64,
        );
        self.check_numeric_range(
            record,
            outcome,
            "square_feet",
            self.config.min_square_feet as f64,
            self.config.max_square_feet as f64,
        );
        self.check_numeric_range(
            record,
            outcome,
            "lot_size",
            self.config.min_lot_size,
            self.config.max_lot_size,
        );
        self.check_numeric_range(
            record,
            outcome,
            "year_built",
            self.config.min_year_built as f64,
            (self.reference_year + 5) as f64,
        );
    }

    /// Price fields go through the same lenient parser the transformer uses,
    /// so range text like "1200-1800 per month" validates on its first value
    fn check_price_field(
        &self,
        record: &RawListingRecord,
        outcome: &mut ValidationOutcome,
        field: &str,
        is_rent: bool,
    ) {
        if !record.has(field) {
            return;
        }

        let cents = match record.get_number(field) {
            Some(value) => crate::normalize::price_number_to_cents(
                value,
                self.thousands_threshold,
                is_rent,
            ),
            None => record
                .get_str(field)
                .and_then(|text| parse_price_cents(text, self.thousands_threshold, is_rent)),
        };

        let Some(cents) = cents else {
            outcome
                .diagnostics
                .push(Diagnostic::new(field, "value is not a parseable price"));
            return;
        };

        let dollars = cents as f64 / 100.0;
        let (min, max) = if is_rent {
            (self.config.min_rent as f64, self.config.max_rent as f64)
        } else {
            (self.config.min_price as f64, self.config.max_price as f64)
        };

        if dollars < min {
            outcome.diagnostics.push(Diagnostic::new(
                field,
                format!("value {dollars} is below minimum {min}"),
            ));
        }
        if dollars > max {
            outcome.diagnostics.push(Diagnostic::new(
                field,
                format!("value {dollars} is above maximum {max}"),
            ));
        }
    }

    fn check_numeric_range(
        &self,
        record: &RawListingRecord,
        outcome: &mut ValidationOutcome,
        field: &str,
        min: f64,
        max: f64,
    ) {
        if !record.has(field) {
            return;
        }

        let Some(value) = record.get_number(field) else {
            outcome
                .diagnostics
                .push(Diagnostic::new(field, "value is not numeric"));
            return;
        };

        if value < min {
            outcome.diagnostics.push(Diagnostic::new(
                field,
                format!("value {value} is below minimum {min}"),
            ));
        }
        if value > max {
            outcome.diagnostics.push(Diagnostic::new(
                field,
                format!("value {value} is above maximum {max}"),
            ));
        }
    }

    fn check_enums(&self, record: &RawListingRecord, outcome: &mut ValidationOutcome) {
        // Property type labels are mapped leniently during transform (unknown
        // labels become Other), so only listing status can fail membership.
        if let Some(status) = record.get_str("listing_status") {
            if !status.is_empty() && ListingStatus::from_label(status).is_none() {
                outcome.diagnostics.push(Diagnostic::new(
                    "listing_status",
                    format!("unrecognized listing status: {status}"),
                ));
            }
        }
    }

    fn check_address(&self, record: &RawListingRecord, outcome: &mut ValidationOutcome) {
        if let Some(state) = record.get_str("state") {
            if !state.is_empty() && !is_valid_state(state) {
                outcome.diagnostics.push(Diagnostic::new(
                    "state",
                    format!("invalid state: {state}"),
                ));
            }
        }

        if let Some(zip) = record.get_str("zip_code") {
            if !zip.is_empty() && zip5(zip).is_none() {
                outcome.diagnostics.push(Diagnostic::new(
                    "zip_code",
                    format!("invalid zip code: {zip}"),
                ));
            }
        }

        if let Some(lat) = record.get_number("latitude") {
            if !(-90.0..=90.0).contains(&lat) {
                outcome.diagnostics.push(Diagnostic::new(
                    "latitude",
                    format!("latitude {lat} out of range"),
                ));
            }
        }

        if let Some(lon) = record.get_number("longitude") {
            if !(-180.0..=180.0).contains(&lon) {
                outcome.diagnostics.push(Diagnostic::new(
                    "longitude",
                    format!("longitude {lon} out of range"),
                ));
            }
        }
    }

    fn check_cross_field(&self, record: &RawListingRecord, outcome: &mut ValidationOutcome) {
        let bedrooms = record.get_number("bedrooms");
        let bathrooms = record.get_number("bathrooms");
        let square_feet = record.get_number("square_feet");
        let price = record.get_number("price");

        // Reported price-per-sqft must be within 10% of the computed value
        if let (Some(price), Some(sqft), Some(reported)) =
            (price, square_feet, record.get_number("price_per_sqft"))
        {
            if sqft > 0.0 && reported > 0.0 {
                let computed = price / sqft;
                if ((computed - reported) / reported).abs() > 0.1 {
                    outcome.diagnostics.push(Diagnostic::new(
                        "price_per_sqft",
                        format!(
                            "inconsistent price per square foot: computed {computed:.2}, reported {reported:.2}"
                        ),
                    ));
                }
            }
        }

        if let (Some(beds), Some(baths)) = (bedrooms, bathrooms) {
            if beds > 0.0 && baths > beds * 2.0 {
                outcome.diagnostics.push(Diagnostic::new(
                    "bathrooms",
                    format!("unusual ratio: {beds} bedrooms, {baths} bathrooms"),
                ));
            }
        }

        if let (Some(beds), Some(sqft)) = (bedrooms, square_feet) {
            if beds > 0.0 && sqft > 0.0 {
                let per_bedroom = sqft / beds;
                if per_bedroom < 70.0 {
                    outcome.diagnostics.push(Diagnostic::new(
                        "square_feet",
                        format!("very small space per bedroom: {per_bedroom:.0} sqft"),
                    ));
                } else if per_bedroom > 2000.0 {
                    outcome.diagnostics.push(Diagnostic::new(
                        "square_feet",
                        format!("very large space per bedroom: {per_bedroom:.0} sqft"),
                    ));
                }
            }
        }

        if let Some(year) = record.get_number("year_built") {
            if year > self.reference_year as f64 {
                outcome.diagnostics.push(Diagnostic::new(
                    "year_built",
                    format!("year built {year} is in the future"),
                ));
            }
        }
    }
}
