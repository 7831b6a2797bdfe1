//! In-memory sink for tests and dry runs

use crate::record::Listing;
use crate::storage::traits::{ListingSink, SinkResult};
use std::sync::Mutex;

/// Sink that keeps listings in a vec
#[derive(Default)]
pub struct MemorySink {
    rows: Mutex<Vec<Listing>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything persisted so far
    pub fn rows(&self) -> Vec<Listing> {
        self.rows.lock().expect("sink lock poisoned").clone()
    }
}

impl ListingSink for MemorySink {
    fn persist(&self, listing: &Listing) -> SinkResult<()> {
        self.rows
            .lock()
            .expect("sink lock poisoned")
            .push(listing.clone());
        Ok(())
    }

    fn count(&self) -> SinkResult<usize> {
        Ok(self.rows.lock().expect("sink lock poisoned").len())
    }
}
