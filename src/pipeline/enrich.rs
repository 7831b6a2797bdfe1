//! Derived-field enrichment
//!
//! Fills the calculated fields on listings that survive deduplication:
//! price per square foot, estimated rental yield, property age, and the
//! price delta against the batch-local city median.

use crate::record::Listing;
use std::collections::HashMap;

/// Enriches a batch in place
///
/// Median prices are computed from this batch only; a listing in a city
/// with no priced peers gets no median comparison.
pub fn enrich_batch(listings: &mut [Listing], reference_year: i32) {
    let medians = city_median_prices(listings);

    for listing in listings.iter_mut() {
        enrich_listing(listing, reference_year);

        if let (Some(price), Some(city)) = (listing.price_cents, &listing.city) {
            if let Some(&median) = medians.get(&city.to_lowercase()) {
                if median > 0 {
                    listing.price_vs_city_median =
                        Some((price - median) as f64 / median as f64 * 100.0);
                }
            }
        }
    }
}

fn enrich_listing(listing: &mut Listing, reference_year: i32) {
    if let (Some(price), Some(sqft)) = (listing.price_dollars(), listing.square_feet) {
        if sqft > 0 {
            listing.price_per_sqft = Some(price / sqft as f64);
        }
    }

    if let (Some(rent), Some(price)) = (listing.rent_dollars(), listing.price_dollars()) {
        if price > 0.0 {
            listing.rental_yield = Some(rent * 12.0 / price * 100.0);
        }
    }

    if let Some(year) = listing.year_built {
        listing.property_age = Some(reference_year - year);
    }
}

/// Median price in cents per lowercased city name
fn city_median_prices(listings: &[Listing]) -> HashMap<String, i64> {
    let mut by_city: HashMap<String, Vec<i64>> = HashMap::new();

    for listing in listings {
        if let (Some(city), Some(price)) = (&listing.city, listing.price_cents) {
            by_city.entry(city.to_lowercase()).or_default().push(price);
        }
    }

    by_city
        .into_iter()
        .map(|(city, mut prices)| {
            prices.sort_unstable();
            let mid = prices.len() / 2;
            let median = if prices.len() % 2 == 0 {
                (prices[mid - 1] + prices[mid]) / 2
            } else {
                prices[mid]
            };
            (city, median)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SourceId;
    use chrono::Utc;

    fn create_test_listing(external_id: &str, city: &str, price_cents: i64) -> Listing {
        let mut listing = Listing::new(
            SourceId::Zillow,
            external_id.to_string(),
            format!("https://example.com/{external_id}"),
            Utc::now(),
        );
        listing.city = Some(city.to_string());
        listing.price_cents = Some(price_cents);
        listing
    }

    #[test]
    fn test_price_per_sqft() {
        let mut listing = create_test_listing("z1", "Austin", 45_000_000);
        listing.square_feet = Some(1800);

        enrich_batch(std::slice::from_mut(&mut listing), 2026);
        assert_eq!(listing.price_per_sqft, Some(250.0));
    }

    #[test]
    fn test_rental_yield() {
        let mut listing = create_test_listing("z1", "Austin", 45_000_000);
        listing.rent_estimate_cents = Some(300_000); // $3,000/month

        enrich_batch(std::slice::from_mut(&mut listing), 2026);
        assert_eq!(listing.rental_yield, Some(8.0));
    }

    #[test]
    fn test_property_age() {
        let mut listing = create_test_listing("z1", "Austin", 45_000_000);
        listing.year_built = Some(1990);

        enrich_batch(std::slice::from_mut(&mut listing), 2026);
        assert_eq!(listing.property_age, Some(36));
    }

    #[test]
    fn test_city_median_comparison() {
        let mut batch = vec![
            create_test_listing("z1", "Austin", 40_000_000),
            create_test_listing("z2", "Austin", 50_000_000),
            create_test_listing("z3", "Austin", 60_000_000),
        ];

        enrich_batch(&mut batch, 2026);
        // Median is 500k; 400k is 20% below, 600k is 20% above
        assert_eq!(batch[0].price_vs_city_median, Some(-20.0));
        assert_eq!(batch[1].price_vs_city_median, Some(0.0));
        assert_eq!(batch[2].price_vs_city_median, Some(20.0));
    }

    #[test]
    fn test_cities_are_independent() {
        let mut batch = vec![
            create_test_listing("z1", "Austin", 40_000_000),
            create_test_listing("z2", "Dallas", 90_000_000),
        ];

        enrich_batch(&mut batch, 2026);
        // Each city's single listing sits exactly at its own median
        assert_eq!(batch[0].price_vs_city_median, Some(0.0));
        assert_eq!(batch[1].price_vs_city_median, Some(0.0));
    }

    #[test]
    fn test_missing_inputs_leave_fields_unset() {
        let mut listing = Listing::new(
            SourceId::Redfin,
            "r1".to_string(),
            "https://example.com/r1".to_string(),
            Utc::now(),
        );

        enrich_batch(std::slice::from_mut(&mut listing), 2026);
        assert_eq!(listing.price_per_sqft, None);
        assert_eq!(listing.rental_yield, None);
        assert_eq!(listing.property_age, None);
        assert_eq!(listing.price_vs_city_median, None);
    }
}
