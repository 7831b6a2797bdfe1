//! Selector-table portal adapter
//!
//! One adapter implementation covers all supported portals; what differs per
//! portal is a table of ordered CSS selectors. Each field lists its selectors
//! most-specific first, and the first selector yielding non-empty text wins,
//! so a portal markup change means editing a table, not the parser.

use crate::crawl::{PageRequest, SearchCriteria, SourceAdapter};
use crate::normalize::{extract_bathrooms, extract_bedrooms, extract_square_feet};
use crate::record::{RawListingRecord, SourceId};
use crate::{Result, ScoutError};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;
use url::Url;

/// Ordered selectors for one portal's markup
struct SelectorTable {
    /// Result-card selectors, tried in order until one yields cards
    cards: &'static [&'static str],
    /// Link selectors within a card
    link: &'static [&'static str],
    price: &'static [&'static str],
    address: &'static [&'static str],
    /// Summary text holding beds/baths/sqft ("3 bds, 2 ba, 1,800 sqft")
    details: &'static [&'static str],
    property_type: &'static [&'static str],
    listing_status: &'static [&'static str],
    image: &'static [&'static str],
    /// Detail-page selectors
    detail_description: &'static [&'static str],
    detail_year_built: &'static [&'static str],
    detail_lot_size: &'static [&'static str],
    detail_rent_estimate: &'static [&'static str],
}

const ZILLOW_TABLE: SelectorTable = SelectorTable {
    cards: &[".list-card-info", ".list-card"],
    link: &["a[href*=\"/homedetails/\"]", "a[href]"],
    price: &[".list-card-price"],
    address: &[".list-card-addr"],
    details: &[".list-card-details"],
    property_type: &[".list-card-type"],
    listing_status: &[".list-card-status"],
    image: &[".list-card-img img"],
    detail_description: &[".ds-overview-section"],
    detail_year_built: &[".ds-year-built"],
    detail_lot_size: &[".ds-lot-size"],
    detail_rent_estimate: &[".zestimate"],
};

const REDFIN_TABLE: SelectorTable = SelectorTable {
    cards: &[".HomeCardContainer", ".HomeCard"],
    link: &["a[href*=\"/home/\"]", "a[href]"],
    price: &[".homecardV2Price", ".price"],
    address: &[".homeAddressV2", ".street-address"],
    details: &[".HomeStatsV2", ".stats"],
    property_type: &[".propertyType"],
    listing_status: &[".HomeSash", ".status"],
    image: &[".homecard-image img", "img"],
    detail_description: &[".remarks"],
    detail_year_built: &[".year-built"],
    detail_lot_size: &[".lot-size"],
    detail_rent_estimate: &[".rental-estimate"],
};

const APARTMENTS_TABLE: SelectorTable = SelectorTable {
    cards: &[".property-card", ".placard"],
    link: &["a.property-link", "a[href]"],
    price: &[".property-pricing", ".rent-range"],
    address: &[".property-address"],
    details: &[".bed-bath", ".property-beds"],
    property_type: &[".property-type"],
    listing_status: &[".availability", ".available-date"],
    image: &[".property-photo img", ".photo img"],
    detail_description: &[".property-description", ".description"],
    detail_year_built: &[".year-built"],
    detail_lot_size: &[".lot-size"],
    detail_rent_estimate: &[".unit-price", ".rentInfo"],
};

/// HTML portal adapter driven by a per-source selector table
pub struct PortalAdapter {
    source: SourceId,
    base_url: Url,
    skipped_cards: AtomicUsize,
}

impl PortalAdapter {
    /// Creates an adapter for a portal rooted at `base_url`
    pub fn new(source: SourceId, base_url: &str) -> Result<Self> {
        Ok(Self {
            source,
            base_url: Url::parse(base_url)?,
            skipped_cards: AtomicUsize::new(0),
        })
    }

    /// Cards dropped so far because their markup lacked a usable link
    pub fn skipped_card_count(&self) -> usize {
        self.skipped_cards.load(Ordering::Relaxed)
    }

    fn table(&self) -> &'static SelectorTable {
        match self.source {
            SourceId::Zillow => &ZILLOW_TABLE,
            SourceId::Redfin => &REDFIN_TABLE,
            SourceId::ApartmentsCom => &APARTMENTS_TABLE,
        }
    }

    /// Parses one result card into a raw record
    fn parse_card(&self, card: ElementRef<'_>) -> Option<RawListingRecord> {
        let table = self.table();

        let href = select_attr(card, table.link, "href")?;
        let url = self.base_url.join(&href).ok()?;
        let external_id = external_id_from_url(&url)?;

        let mut record = RawListingRecord::new(self.source, external_id, url.as_str());

        // Apartment portals quote rent, sale portals quote price
        let price_field = match self.source {
            SourceId::ApartmentsCom => "rent_estimate",
            _ => "price",
        };
        if let Some(price) = select_text(card, table.price) {
            record.set(price_field, price);
        }

        if let Some(address) = select_text(card, table.address) {
            set_address_parts(&mut record, &address);
        }

        if let Some(details) = select_text(card, table.details) {
            set_measurements(&mut record, &details);
        }

        if let Some(property_type) = select_text(card, table.property_type) {
            record.set("property_type", property_type);
        }

        if let Some(status) = select_text(card, table.listing_status) {
            record.set("listing_status", status);
        }

        if let Some(src) = select_attr(card, table.image, "src") {
            record.set("images", Value::Array(vec![Value::String(src)]));
        }

        Some(record)
    }
}

impl SourceAdapter for PortalAdapter {
    fn source(&self) -> SourceId {
        self.source
    }

    fn build_page_request(&self, criteria: &SearchCriteria, page: u32) -> Result<PageRequest> {
        let mut url = self.base_url.join("search")?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("location", &criteria.location);
            query.append_pair("page", &page.to_string());

            if let Some(min) = criteria.min_price {
                query.append_pair("price_min", &min.to_string());
            }
            if let Some(max) = criteria.max_price {
                query.append_pair("price_max", &max.to_string());
            }
            if let Some(min) = criteria.min_bedrooms {
                query.append_pair("beds_min", &min.to_string());
            }
            if let Some(max) = criteria.max_bedrooms {
                query.append_pair("beds_max", &max.to_string());
            }
        }

        Ok(PageRequest {
            url: url.to_string(),
        })
    }

    fn parse_items(&self, body: &str, page: u32) -> Result<Vec<RawListingRecord>> {
        let document = Html::parse_document(body);
        let table = self.table();

        let mut cards = Vec::new();
        for selector_str in table.cards {
            if let Ok(selector) = Selector::parse(selector_str) {
                cards = document.select(&selector).collect();
                if !cards.is_empty() {
                    break;
                }
            }
        }

        if cards.is_empty() {
            // An empty page with the portal's result container present is a
            // real end of results; a page without it is a markup change
            if has_results_container(&document) {
                return Ok(Vec::new());
            }
            return Err(ScoutError::AdapterParse {
                page,
                message: "no result cards found in page".to_string(),
            });
        }

        let total = cards.len();
        let records: Vec<RawListingRecord> = cards
            .into_iter()
            .filter_map(|card| self.parse_card(card))
            .collect();

        let skipped = total - records.len();
        if skipped > 0 {
            self.skipped_cards.fetch_add(skipped, Ordering::Relaxed);
            warn!(page, skipped, total, "skipped cards missing a listing link");
        }

        Ok(records)
    }

    fn parse_detail(&self, record: &mut RawListingRecord, body: &str) -> Result<()> {
        let document = Html::parse_document(body);
        let root = document.root_element();
        let table = self.table();

        let detail_fields: &[(&str, &[&str])] = &[
            ("description", table.detail_description),
            ("year_built", table.detail_year_built),
            ("lot_size", table.detail_lot_size),
            ("rent_estimate", table.detail_rent_estimate),
        ];

        for (field, selectors) in detail_fields {
            if record.has(field) {
                continue;
            }
            if let Some(text) = select_text(root, selectors) {
                record.set(*field, text);
            }
        }

        Ok(())
    }
}

/// First non-empty text under any of the selectors, in order
fn select_text(root: ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    for selector_str in selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = root.select(&selector).next() {
                let text = element.text().collect::<String>().trim().to_string();
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
    }
    None
}

/// First non-empty attribute value under any of the selectors, in order
fn select_attr(root: ElementRef<'_>, selectors: &[&str], attr: &str) -> Option<String> {
    for selector_str in selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = root.select(&selector).next() {
                if let Some(value) = element.value().attr(attr) {
                    if !value.is_empty() {
                        return Some(value.to_string());
                    }
                }
            }
        }
    }
    None
}

/// Derives a stable external id from the listing URL's last path segment
fn external_id_from_url(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}

/// Splits "123 Main St, Austin, TX 78701" into address components
fn set_address_parts(record: &mut RawListingRecord, address: &str) {
    let parts: Vec<&str> = address.split(',').map(str::trim).collect();

    match parts.as_slice() {
        [street, city, region, ..] => {
            record.set("street_address", *street);
            record.set("city", *city);

            let mut region_words = region.split_whitespace();
            if let Some(state) = region_words.next() {
                record.set("state", state);
            }
            if let Some(zip) = region_words.next() {
                record.set("zip_code", zip);
            }
        }
        [street, city] => {
            record.set("street_address", *street);
            record.set("city", *city);
        }
        [street] => {
            record.set("street_address", *street);
        }
        [] => {}
    }
}

/// Pulls beds/baths/sqft out of a card's summary text
fn set_measurements(record: &mut RawListingRecord, details: &str) {
    if let Some(beds) = extract_bedrooms(details) {
        record.set("bedrooms", beds);
    }
    if let Some(baths) = extract_bathrooms(details) {
        record.set("bathrooms", baths);
    }
    if let Some(sqft) = extract_square_feet(details) {
        record.set("square_feet", sqft);
    }
}

/// True when the page carries a recognizable (possibly empty) results area
fn has_results_container(document: &Html) -> bool {
    for selector_str in ["[data-results]", ".search-results", "#search-results"] {
        if let Ok(selector) = Selector::parse(selector_str) {
            if document.select(&selector).next().is_some() {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZILLOW_PAGE: &str = r#"
        <html><body><div class="search-results">
          <div class="list-card-info">
            <a href="/homedetails/12345_zpid/">View</a>
            <div class="list-card-price">$450,000</div>
            <div class="list-card-addr">123 Main St, Austin, TX 78701</div>
            <div class="list-card-details">3 bds, 2 ba, 1,800 sqft</div>
            <div class="list-card-type">Single Family</div>
          </div>
          <div class="list-card-info">
            <a href="/homedetails/67890_zpid/">View</a>
            <div class="list-card-price">$1.2M</div>
            <div class="list-card-addr">987 Oak Ave, Austin, TX 78702</div>
          </div>
        </div></body></html>
    "#;

    fn create_test_adapter() -> PortalAdapter {
        PortalAdapter::new(SourceId::Zillow, "https://portal.test").unwrap()
    }

    #[test]
    fn test_parse_items_extracts_cards() {
        let adapter = create_test_adapter();
        let records = adapter.parse_items(ZILLOW_PAGE, 1).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].external_id, "12345_zpid");
        assert_eq!(records[0].get_str("price"), Some("$450,000"));
        assert_eq!(records[0].get_str("street_address"), Some("123 Main St"));
        assert_eq!(records[0].get_str("city"), Some("Austin"));
        assert_eq!(records[0].get_str("state"), Some("TX"));
        assert_eq!(records[0].get_str("zip_code"), Some("78701"));
        assert_eq!(records[0].get_number("bedrooms"), Some(3.0));
        assert_eq!(records[0].get_number("bathrooms"), Some(2.0));
        assert_eq!(records[0].get_number("square_feet"), Some(1800.0));
        assert_eq!(records[0].get_str("property_type"), Some("Single Family"));
    }

    #[test]
    fn test_broken_card_is_skipped_and_counted() {
        let adapter = create_test_adapter();
        let page = r#"
            <html><body><div class="search-results">
              <div class="list-card-info">
                <a href="/homedetails/12345_zpid/">View</a>
                <div class="list-card-price">$450,000</div>
                <div class="list-card-addr">123 Main St, Austin, TX 78701</div>
              </div>
              <div class="list-card-info">
                <div class="list-card-price">$999,000</div>
                <div class="list-card-addr">1 Broken Card Way, Austin, TX 78701</div>
              </div>
            </div></body></html>
        "#;

        let records = adapter.parse_items(page, 1).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].external_id, "12345_zpid");
        assert_eq!(adapter.skipped_card_count(), 1);
    }

    #[test]
    fn test_empty_results_container_ends_crawl() {
        let adapter = create_test_adapter();
        let page = r#"<html><body><div class="search-results"></div></body></html>"#;
        assert!(adapter.parse_items(page, 3).unwrap().is_empty());
    }

    #[test]
    fn test_unrecognizable_page_is_parse_error() {
        let adapter = create_test_adapter();
        let result = adapter.parse_items("<html><body><p>oops</p></body></html>", 2);
        assert!(matches!(result, Err(ScoutError::AdapterParse { page: 2, .. })));
    }

    #[test]
    fn test_build_page_request_carries_criteria() {
        let adapter = create_test_adapter();
        let criteria = SearchCriteria::for_location("Austin, TX")
            .with_price_range(Some(200_000), Some(600_000))
            .with_bedrooms(Some(2), None);

        let request = adapter.build_page_request(&criteria, 2).unwrap();
        assert!(request.url.contains("location=Austin"));
        assert!(request.url.contains("page=2"));
        assert!(request.url.contains("price_min=200000"));
        assert!(request.url.contains("price_max=600000"));
        assert!(request.url.contains("beds_min=2"));
        assert!(!request.url.contains("beds_max"));
    }

    #[test]
    fn test_parse_detail_fills_missing_fields_only() {
        let adapter = create_test_adapter();
        let mut record = RawListingRecord::new(SourceId::Zillow, "z1", "https://portal.test/1");
        record.set("description", "already here");

        let detail = r#"
            <html><body>
              <div class="ds-overview-section">A lovely home</div>
              <div class="ds-year-built">1990</div>
              <div class="ds-lot-size">0.25</div>
            </body></html>
        "#;

        adapter.parse_detail(&mut record, detail).unwrap();
        assert_eq!(record.get_str("description"), Some("already here"));
        assert_eq!(record.get_str("year_built"), Some("1990"));
        assert_eq!(record.get_str("lot_size"), Some("0.25"));
    }

    #[test]
    fn test_apartments_price_lands_in_rent() {
        let adapter = PortalAdapter::new(SourceId::ApartmentsCom, "https://portal.test").unwrap();
        let page = r#"
            <html><body><div class="search-results">
              <div class="property-card">
                <a class="property-link" href="/apt/park-place-101">Park Place</a>
                <div class="property-pricing">$1,200 - $1,800</div>
                <div class="property-address">55 Elm St, Austin, TX 78703</div>
              </div>
            </div></body></html>
        "#;

        let records = adapter.parse_items(page, 1).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get_str("rent_estimate"), Some("$1,200 - $1,800"));
        assert!(!records[0].has("price"));
    }
}
