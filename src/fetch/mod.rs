//! Polite HTTP fetching
//!
//! This module owns everything between "the crawler wants this URL" and "here
//! is the classified response": request pacing, identity rotation, and
//! outcome classification.

mod fetcher;
mod identity;
mod limiter;

pub use fetcher::{FetchOutcome, RateLimitedFetcher};
pub use identity::{Identity, IdentityPool};
pub use limiter::RateLimiter;
