//! Record types shared across the crawl loop and the pipeline
//!
//! Two representations exist: `RawListingRecord` is the loosely typed field
//! map a source adapter produces, and `Listing` is the canonical typed record
//! the pipeline emits.

mod listing;
mod raw;

pub use listing::{Listing, ListingStatus, PropertyType};
pub use raw::{RawListingRecord, SourceId};
