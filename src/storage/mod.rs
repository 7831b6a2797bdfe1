//! Listing storage
//!
//! The pipeline talks to storage through the `ListingSink` trait; the SQLite
//! backend is the production sink and the in-memory backend serves tests and
//! dry runs.

mod memory;
mod sqlite;
mod traits;

pub use memory::MemorySink;
pub use sqlite::SqliteSink;
pub use traits::{ListingSink, SinkError, SinkResult};
