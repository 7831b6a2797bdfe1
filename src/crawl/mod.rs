//! Crawl orchestration
//!
//! This module handles:
//! - Search criteria describing what to crawl for
//! - The source adapter trait portals implement
//! - The pull-based controller that paginates through a portal

mod adapter;
mod controller;
mod criteria;

pub use adapter::{PageRequest, SourceAdapter};
pub use controller::CrawlController;
pub use criteria::SearchCriteria;
