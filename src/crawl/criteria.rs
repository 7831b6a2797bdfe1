//! Search criteria for a crawl run

/// What to search a listing portal for
///
/// Price bounds are whole dollars, matching how portals take them in query
/// strings. `max_results` of None means crawl until the portal runs out of
/// pages.
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    /// Free-form location query (city, zip, neighborhood)
    pub location: String,

    /// Minimum price in whole dollars
    pub min_price: Option<i64>,

    /// Maximum price in whole dollars
    pub max_price: Option<i64>,

    /// Minimum bedroom count
    pub min_bedrooms: Option<u32>,

    /// Maximum bedroom count
    pub max_bedrooms: Option<u32>,

    /// Stop after yielding this many records
    pub max_results: Option<usize>,

    /// Also fetch each listing's detail page
    pub fetch_details: bool,
}

impl SearchCriteria {
    /// Creates criteria for a location with everything else unset
    pub fn for_location(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Default::default()
        }
    }

    /// Sets the price range in whole dollars
    pub fn with_price_range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    /// Sets the bedroom range
    pub fn with_bedrooms(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_bedrooms = min;
        self.max_bedrooms = max;
        self
    }

    /// Caps the number of records yielded
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }

    /// Enables detail-page fetching
    pub fn with_details(mut self) -> Self {
        self.fetch_details = true;
        self
    }
}
