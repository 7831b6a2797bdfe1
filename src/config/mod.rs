//! Configuration module for Parcel-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files covering fetcher rate limits, identity rotation, validation range
//! tables, dedup weights, and pipeline knobs.
//!
//! # Example
//!
//! ```no_run
//! use parcel_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Quota: {} requests/minute", config.fetch.requests_per_minute);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, DedupConfig, FetchConfig, IdentityConfig, OutputConfig, PipelineConfig,
    ValidationConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
