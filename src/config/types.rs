use serde::Deserialize;

/// Main configuration structure for Parcel-Scout
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub dedup: DedupConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Fetcher rate limiting and retry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Maximum requests allowed in any rolling 60 second window
    #[serde(rename = "requests-per-minute", default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    /// Minimum time between consecutive requests (milliseconds)
    #[serde(
        rename = "delay-between-requests-ms",
        default = "default_delay_between_requests_ms"
    )]
    pub delay_between_requests_ms: u64,

    /// Lower bound of the random extra delay (milliseconds, 0 disables jitter)
    #[serde(rename = "jitter-min-ms", default)]
    pub jitter_min_ms: u64,

    /// Upper bound of the random extra delay (milliseconds, 0 disables jitter)
    #[serde(rename = "jitter-max-ms", default)]
    pub jitter_max_ms: u64,

    /// Retry budget for throttled/blocked responses during a crawl
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Identity rotation configuration (user agents and proxies)
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// User agent strings rotated round-robin
    #[serde(rename = "user-agents", default = "default_user_agents")]
    pub user_agents: Vec<String>,

    /// Proxy URLs rotated round-robin alongside user agents (may be empty)
    #[serde(default)]
    pub proxies: Vec<String>,

    /// When false, the first user agent is pinned and only proxies rotate
    #[serde(rename = "rotate-user-agents", default = "default_rotate_user_agents")]
    pub rotate_user_agents: bool,
}

/// Range tables applied by the record validator
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    /// Sale price bounds in whole dollars
    #[serde(rename = "min-price", default = "default_min_price")]
    pub min_price: i64,
    #[serde(rename = "max-price", default = "default_max_price")]
    pub max_price: i64,

    /// Monthly rent bounds in whole dollars
    #[serde(rename = "min-rent", default = "default_min_rent")]
    pub min_rent: i64,
    #[serde(rename = "max-rent", default = "default_max_rent")]
    pub max_rent: i64,

    #[serde(rename = "max-bedrooms", default = "default_max_rooms")]
    pub max_bedrooms: u32,
    #[serde(rename = "max-bathrooms", default = "default_max_rooms")]
    pub max_bathrooms: u32,

    #[serde(rename = "min-square-feet", default = "default_min_square_feet")]
    pub min_square_feet: u32,
    #[serde(rename = "max-square-feet", default = "default_max_square_feet")]
    pub max_square_feet: u32,

    /// Lot size bounds in acres
    #[serde(rename = "min-lot-size", default = "default_min_lot_size")]
    pub min_lot_size: f64,
    #[serde(rename = "max-lot-size", default = "default_max_lot_size")]
    pub max_lot_size: f64,

    #[serde(rename = "min-year-built", default = "default_min_year_built")]
    pub min_year_built: i32,
}

/// Fuzzy duplicate detection weights and threshold
#[derive(Debug, Clone, Deserialize)]
pub struct DedupConfig {
    /// Composite similarity at or above this value marks a fuzzy duplicate
    #[serde(rename = "similarity-threshold", default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    #[serde(rename = "street-weight", default = "default_street_weight")]
    pub street_weight: f64,
    #[serde(rename = "city-weight", default = "default_city_weight")]
    pub city_weight: f64,
    #[serde(rename = "state-weight", default = "default_state_weight")]
    pub state_weight: f64,
    #[serde(rename = "zip-weight", default = "default_zip_weight")]
    pub zip_weight: f64,
    #[serde(rename = "bedrooms-weight", default = "default_room_weight")]
    pub bedrooms_weight: f64,
    #[serde(rename = "bathrooms-weight", default = "default_room_weight")]
    pub bathrooms_weight: f64,
    #[serde(rename = "square-feet-weight", default = "default_room_weight")]
    pub square_feet_weight: f64,
}

/// Pipeline-wide behavior knobs
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Maximum number of per-record error messages kept in a batch result
    #[serde(rename = "max-error-samples", default = "default_max_error_samples")]
    pub max_error_samples: usize,

    /// Bare prices below this value are treated as thousands of dollars
    #[serde(
        rename = "price-thousands-threshold",
        default = "default_price_thousands_threshold"
    )]
    pub price_thousands_threshold: i64,

    /// Abort processing of remaining records after this many seconds (0 = off)
    #[serde(rename = "batch-timeout-secs", default)]
    pub batch_timeout_secs: u64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

fn default_requests_per_minute() -> u32 {
    60
}

fn default_delay_between_requests_ms() -> u64 {
    2000
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agents() -> Vec<String> {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36".to_string(),
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36".to_string(),
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36".to_string(),
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0".to_string(),
    ]
}

fn default_rotate_user_agents() -> bool {
    true
}

fn default_min_price() -> i64 {
    1_000
}

fn default_max_price() -> i64 {
    100_000_000
}

fn default_min_rent() -> i64 {
    100
}

fn default_max_rent() -> i64 {
    50_000
}

fn default_max_rooms() -> u32 {
    20
}

fn default_min_square_feet() -> u32 {
    100
}

fn default_max_square_feet() -> u32 {
    100_000
}

fn default_min_lot_size() -> f64 {
    0.01
}

fn default_max_lot_size() -> f64 {
    1000.0
}

fn default_min_year_built() -> i32 {
    1800
}

fn default_similarity_threshold() -> f64 {
    0.85
}

fn default_street_weight() -> f64 {
    0.30
}

fn default_city_weight() -> f64 {
    0.15
}

fn default_state_weight() -> f64 {
    0.10
}

fn default_zip_weight() -> f64 {
    0.15
}

fn default_room_weight() -> f64 {
    0.10
}

fn default_max_error_samples() -> usize {
    25
}

fn default_price_thousands_threshold() -> i64 {
    10_000
}

fn default_database_path() -> String {
    "./listings.db".to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: default_requests_per_minute(),
            delay_between_requests_ms: default_delay_between_requests_ms(),
            jitter_min_ms: 0,
            jitter_max_ms: 0,
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            user_agents: default_user_agents(),
            proxies: Vec::new(),
            rotate_user_agents: true,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_price: default_min_price(),
            max_price: default_max_price(),
            min_rent: default_min_rent(),
            max_rent: default_max_rent(),
            max_bedrooms: default_max_rooms(),
            max_bathrooms: default_max_rooms(),
            min_square_feet: default_min_square_feet(),
            max_square_feet: default_max_square_feet(),
            min_lot_size: default_min_lot_size(),
            max_lot_size: default_max_lot_size(),
            min_year_built: default_min_year_built(),
        }
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            street_weight: default_street_weight(),
            city_weight: default_city_weight(),
            state_weight: default_state_weight(),
            zip_weight: default_zip_weight(),
            bedrooms_weight: default_room_weight(),
            bathrooms_weight: default_room_weight(),
            square_feet_weight: default_room_weight(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_error_samples: default_max_error_samples(),
            price_thousands_threshold: default_price_thousands_threshold(),
            batch_timeout_secs: 0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}
