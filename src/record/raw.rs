use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifies the listing portal a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    Zillow,
    Redfin,
    ApartmentsCom,
}

impl SourceId {
    /// Stable identifier used in storage and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Zillow => "zillow",
            SourceId::Redfin => "redfin",
            SourceId::ApartmentsCom => "apartments_com",
        }
    }

    /// Parses a source identifier string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "zillow" => Some(SourceId::Zillow),
            "redfin" => Some(SourceId::Redfin),
            "apartments_com" => Some(SourceId::ApartmentsCom),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A listing as scraped: a loosely typed field map plus provenance
///
/// Raw records exist only between the crawl loop and the pipeline; they are
/// discarded once normalized or rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawListingRecord {
    /// Portal this record was scraped from
    pub source: SourceId,

    /// Portal-assigned listing identifier
    pub external_id: String,

    /// URL of the listing page
    pub url: String,

    /// When the record was fetched
    pub fetched_at: DateTime<Utc>,

    /// Scraped fields, untyped until the pipeline normalizes them
    pub fields: Map<String, Value>,
}

impl RawListingRecord {
    /// Creates an empty record for the given source and external id
    pub fn new(source: SourceId, external_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            source,
            external_id: external_id.into(),
            url: url.into(),
            fetched_at: Utc::now(),
            fields: Map::new(),
        }
    }

    /// Sets a field value
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// Gets a field as a string slice, if present and a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Gets a field as f64, coercing numeric strings with common price
    /// formatting ($ and thousands separators) stripped
    pub fn get_number(&self, key: &str) -> Option<f64> {
        match self.fields.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => crate::normalize::parse_number(&s.replace('$', "")),
            _ => None,
        }
    }

    /// Returns true if the field is present and non-null/non-empty
    pub fn has(&self, key: &str) -> bool {
        match self.fields.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }
}
