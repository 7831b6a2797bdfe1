//! Source adapter trait
//!
//! An adapter knows one portal: how to turn search criteria into page URLs
//! and how to turn the portal's HTML into raw records. Adapters never fetch;
//! the crawl controller owns all HTTP.

use crate::record::{RawListingRecord, SourceId};
use crate::Result;

/// A page the controller should fetch next
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    /// Fully built URL for the results page
    pub url: String,
}

/// Portal-specific request building and HTML parsing
///
/// Implementations must be pure with respect to their inputs: the same body
/// parses to the same records.
pub trait SourceAdapter: Send + Sync {
    /// Which portal this adapter speaks for
    fn source(&self) -> SourceId;

    /// Builds the request for one results page (pages start at 1)
    fn build_page_request(&self, criteria: &crate::crawl::SearchCriteria, page: u32)
        -> Result<PageRequest>;

    /// Parses a results page body into raw records
    ///
    /// An empty vec means the portal has no more results; the controller
    /// stops paginating.
    fn parse_items(&self, body: &str, page: u32) -> Result<Vec<RawListingRecord>>;

    /// Folds a detail page body into an already-parsed record
    ///
    /// Detail parsing only adds fields; values the results page already
    /// provided are kept.
    fn parse_detail(&self, record: &mut RawListingRecord, body: &str) -> Result<()>;
}
