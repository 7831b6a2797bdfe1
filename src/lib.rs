//! Parcel-Scout: a rate-limited real estate listing harvester
//!
//! This crate crawls listing portals under strict rate and anti-blocking
//! constraints, then runs scraped records through a validate, transform,
//! deduplicate, and enrich pipeline before handing clean listings to storage.

pub mod config;
pub mod crawl;
pub mod fetch;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod sources;
pub mod storage;

use thiserror::Error;

/// Main error type for Parcel-Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Blocked by source after identity rotation: {url}")]
    Blocked { url: String },

    #[error("Throttled by source and retry budget exhausted: {url}")]
    Throttled { url: String },

    #[error("Adapter failed to parse page {page}: {message}")]
    AdapterParse { page: u32, message: String },

    #[error("Sink error: {0}")]
    Sink(#[from] storage::SinkError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Parcel-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawl::{CrawlController, SearchCriteria, SourceAdapter};
pub use fetch::{FetchOutcome, RateLimitedFetcher};
pub use pipeline::{PipelineBatchResult, PipelineCoordinator};
pub use record::{Listing, RawListingRecord};
