//! Price and measurement parsing
//!
//! Converts heterogeneous price text ("$450,000", "1,200-1,800 per month",
//! "450K") into integer cents. Pure functions only.

/// Parses price text into integer cents
///
/// Handling, in order:
/// - strips `$`, commas, and surrounding whitespace
/// - ranges keep the first value ("1200-1800" -> 1200)
/// - "per ..." suffixes are dropped ("1200 per month" -> 1200)
/// - "K"/"M" suffixes scale by a thousand / a million
/// - bare sale prices below `thousands_threshold` (whole dollars) are
///   treated as thousands; never applied when `is_rent` is set
///
/// Returns None when no leading number can be parsed.
pub fn parse_price_cents(text: &str, thousands_threshold: i64, is_rent: bool) -> Option<i64> {
    let mut cleaned = text.replace(['$', ','], "").trim().to_string();

    if let Some(idx) = cleaned.find('-') {
        cleaned = cleaned[..idx].trim().to_string();
    }

    if let Some(idx) = cleaned.to_lowercase().find("per") {
        cleaned = cleaned[..idx].trim().to_string();
    }

    let mut multiplier = 1.0_f64;
    if let Some(stripped) = cleaned.strip_suffix(['K', 'k']) {
        cleaned = stripped.trim().to_string();
        multiplier = 1_000.0;
    } else if let Some(stripped) = cleaned.strip_suffix(['M', 'm']) {
        cleaned = stripped.trim().to_string();
        multiplier = 1_000_000.0;
    }

    let mut value: f64 = cleaned.parse().ok()?;
    value *= multiplier;

    if value <= 0.0 {
        return None;
    }

    if !is_rent && multiplier == 1.0 && (value as i64) < thousands_threshold {
        value *= 1_000.0;
    }

    Some((value * 100.0).round() as i64)
}

/// Converts an already-numeric price in whole dollars to cents, applying the
/// same thousands heuristic as the text path
pub fn price_number_to_cents(value: f64, thousands_threshold: i64, is_rent: bool) -> Option<i64> {
    if !value.is_finite() || value <= 0.0 {
        return None;
    }

    let mut value = value;
    if !is_rent && (value as i64) < thousands_threshold {
        value *= 1_000.0;
    }

    Some((value * 100.0).round() as i64)
}

/// Parses a plain number out of text, tolerating thousands separators
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned = text.replace(',', "");
    cleaned.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: i64 = 10_000;

    #[test]
    fn test_parse_formatted_sale_price() {
        assert_eq!(
            parse_price_cents("$450,000", THRESHOLD, false),
            Some(45_000_000)
        );
    }

    #[test]
    fn test_parse_range_takes_first_value() {
        // Rent range with a unit suffix: first value, no thousands scaling
        assert_eq!(
            parse_price_cents("1200-1800 per month", THRESHOLD, true),
            Some(120_000)
        );
        assert_eq!(
            parse_price_cents("$1,200 - $1,800", THRESHOLD, true),
            Some(120_000)
        );
    }

    #[test]
    fn test_parse_suffixes() {
        assert_eq!(parse_price_cents("450K", THRESHOLD, false), Some(45_000_000));
        assert_eq!(
            parse_price_cents("1.2M", THRESHOLD, false),
            Some(120_000_000)
        );
    }

    #[test]
    fn test_thousands_heuristic_sale_only() {
        // Bare 450 as a sale price means $450,000
        assert_eq!(parse_price_cents("450", THRESHOLD, false), Some(45_000_000));
        // The same text as rent stays $450
        assert_eq!(parse_price_cents("450", THRESHOLD, true), Some(45_000));
    }

    #[test]
    fn test_unparseable_returns_none() {
        assert_eq!(parse_price_cents("call for price", THRESHOLD, false), None);
        assert_eq!(parse_price_cents("", THRESHOLD, false), None);
    }

    #[test]
    fn test_price_number_to_cents() {
        assert_eq!(
            price_number_to_cents(450_000.0, THRESHOLD, false),
            Some(45_000_000)
        );
        assert_eq!(
            price_number_to_cents(450.0, THRESHOLD, false),
            Some(45_000_000)
        );
        assert_eq!(price_number_to_cents(-5.0, THRESHOLD, false), None);
    }

    #[test]
    fn test_parse_number_with_separators() {
        assert_eq!(parse_number("1,250"), Some(1250.0));
        assert_eq!(parse_number("3.5"), Some(3.5));
        assert_eq!(parse_number("n/a"), None);
    }
}
