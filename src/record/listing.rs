use crate::record::raw::SourceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Property type taxonomy shared by all sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    House,
    Apartment,
    Condo,
    Townhouse,
    MultiFamily,
    Land,
    Commercial,
    Other,
}

impl PropertyType {
    /// Maps free-form portal labels onto the taxonomy
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("house") || lower.contains("single") {
            PropertyType::House
        } else if lower.contains("condo") {
            PropertyType::Condo
        } else if lower.contains("townhouse") || lower.contains("townhome") {
            PropertyType::Townhouse
        } else if lower.contains("apartment") {
            PropertyType::Apartment
        } else if lower.contains("multi") || lower.contains("duplex") {
            PropertyType::MultiFamily
        } else if lower.contains("land") || lower.contains("lot") {
            PropertyType::Land
        } else if lower.contains("commercial") {
            PropertyType::Commercial
        } else {
            PropertyType::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::House => "house",
            PropertyType::Apartment => "apartment",
            PropertyType::Condo => "condo",
            PropertyType::Townhouse => "townhouse",
            PropertyType::MultiFamily => "multi_family",
            PropertyType::Land => "land",
            PropertyType::Commercial => "commercial",
            PropertyType::Other => "other",
        }
    }

    /// Parses a canonical taxonomy string, rejecting unknown labels
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "house" => Some(PropertyType::House),
            "apartment" => Some(PropertyType::Apartment),
            "condo" => Some(PropertyType::Condo),
            "townhouse" => Some(PropertyType::Townhouse),
            "multi_family" => Some(PropertyType::MultiFamily),
            "land" => Some(PropertyType::Land),
            "commercial" => Some(PropertyType::Commercial),
            "other" => Some(PropertyType::Other),
            _ => None,
        }
    }
}

/// Listing lifecycle status as reported by the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Active,
    Pending,
    Sold,
    OffMarket,
    ComingSoon,
    PriceReduced,
}

impl ListingStatus {
    /// Maps free-form portal labels onto the status taxonomy
    ///
    /// Returns None for labels no portal phrasing matches; callers decide
    /// whether that is a default or a diagnostic.
    pub fn from_label(label: &str) -> Option<Self> {
        let lower = label.to_lowercase();
        if lower.contains("price reduced") || lower.contains("reduced") {
            Some(ListingStatus::PriceReduced)
        } else if lower.contains("coming soon") {
            Some(ListingStatus::ComingSoon)
        } else if lower.contains("off market") || lower.contains("off-market") {
            Some(ListingStatus::OffMarket)
        } else if lower.contains("pending") || lower.contains("contingent") {
            Some(ListingStatus::Pending)
        } else if lower.contains("sold") {
            Some(ListingStatus::Sold)
        } else if lower.contains("active")
            || lower.contains("for sale")
            || lower.contains("for rent")
        {
            Some(ListingStatus::Active)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::Pending => "pending",
            ListingStatus::Sold => "sold",
            ListingStatus::OffMarket => "off_market",
            ListingStatus::ComingSoon => "coming_soon",
            ListingStatus::PriceReduced => "price_reduced",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ListingStatus::Active),
            "pending" => Some(ListingStatus::Pending),
            "sold" => Some(ListingStatus::Sold),
            "off_market" => Some(ListingStatus::OffMarket),
            "coming_soon" => Some(ListingStatus::ComingSoon),
            "price_reduced" => Some(ListingStatus::PriceReduced),
            _ => None,
        }
    }
}

/// A canonical, fully normalized listing record
///
/// Produced by the transformer from a validated raw record. Prices are stored
/// in integer cents; measurements are typed; features are a boolean map keyed
/// by canonical feature names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub source: SourceId,
    pub external_id: String,
    pub url: String,
    pub fetched_at: DateTime<Utc>,

    // Address parts
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    // Measurements
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f64>,
    pub square_feet: Option<u32>,
    pub lot_size: Option<f64>,
    pub year_built: Option<i32>,

    // Pricing in integer cents
    pub price_cents: Option<i64>,
    pub rent_estimate_cents: Option<i64>,

    pub property_type: PropertyType,
    pub listing_status: ListingStatus,

    pub description: Option<String>,
    pub features: BTreeMap<String, bool>,
    pub images: Vec<String>,

    /// Completeness score in [0, 100]
    pub quality_score: f64,

    // Enrichment fields, filled by the pipeline's enrich stage
    pub price_per_sqft: Option<f64>,
    pub rental_yield: Option<f64>,
    pub property_age: Option<i32>,
    pub price_vs_city_median: Option<f64>,
}

impl Listing {
    /// Creates an empty listing with provenance carried over from a raw record
    pub fn new(source: SourceId, external_id: String, url: String, fetched_at: DateTime<Utc>) -> Self {
        Self {
            source,
            external_id,
            url,
            fetched_at,
            street_address: None,
            city: None,
            state: None,
            zip_code: None,
            latitude: None,
            longitude: None,
            bedrooms: None,
            bathrooms: None,
            square_feet: None,
            lot_size: None,
            year_built: None,
            price_cents: None,
            rent_estimate_cents: None,
            property_type: PropertyType::Other,
            listing_status: ListingStatus::Active,
            description: None,
            features: BTreeMap::new(),
            images: Vec::new(),
            quality_score: 0.0,
            price_per_sqft: None,
            rental_yield: None,
            property_age: None,
            price_vs_city_median: None,
        }
    }

    /// Price in whole dollars, when present
    pub fn price_dollars(&self) -> Option<f64> {
        self.price_cents.map(|c| c as f64 / 100.0)
    }

    /// Rent estimate in whole dollars, when present
    pub fn rent_dollars(&self) -> Option<f64> {
        self.rent_estimate_cents.map(|c| c as f64 / 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_type_from_label() {
        assert_eq!(PropertyType::from_label("Single Family Home"), PropertyType::House);
        assert_eq!(PropertyType::from_label("Condo for sale"), PropertyType::Condo);
        assert_eq!(PropertyType::from_label("Townhome"), PropertyType::Townhouse);
        assert_eq!(PropertyType::from_label("Duplex"), PropertyType::MultiFamily);
        assert_eq!(PropertyType::from_label("Vacant lot"), PropertyType::Land);
        assert_eq!(PropertyType::from_label("???"), PropertyType::Other);
    }

    #[test]
    fn test_enum_parse_rejects_unknown() {
        assert_eq!(PropertyType::parse("house"), Some(PropertyType::House));
        assert_eq!(PropertyType::parse("castle"), None);
        assert_eq!(ListingStatus::parse("pending"), Some(ListingStatus::Pending));
        assert_eq!(ListingStatus::parse("haunted"), None);
    }

    #[test]
    fn test_price_dollars_conversion() {
        let mut listing = Listing::new(
            SourceId::Zillow,
            "z1".to_string(),
            "https://example.com/1".to_string(),
            Utc::now(),
        );
        listing.price_cents = Some(45_000_000);
        assert_eq!(listing.price_dollars(), Some(450_000.0));
        assert_eq!(listing.rent_dollars(), None);
    }
}
