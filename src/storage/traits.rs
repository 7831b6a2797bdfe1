//! Storage traits and error types
//!
//! The pipeline only needs a narrow contract from storage: persist one
//! listing, report how many are stored. Backends provide thread-safe access.

use crate::record::Listing;
use thiserror::Error;

/// Errors that can occur during sink operations
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for clean listings leaving the pipeline
pub trait ListingSink: Send + Sync {
    /// Persists one enriched listing
    fn persist(&self, listing: &Listing) -> SinkResult<()>;

    /// Total listings currently stored
    fn count(&self) -> SinkResult<usize>;
}
