//! The listing pipeline
//!
//! This module handles everything between raw scraped records and persisted
//! listings:
//! - Validation with accumulated, field-tagged diagnostics
//! - Pure transformation into canonical listings
//! - Exact and fuzzy duplicate detection
//! - Derived-field enrichment
//! - The coordinator that runs the stages in order

mod coordinator;
mod dedup;
mod enrich;
mod transformer;
mod validator;

pub use coordinator::{PipelineBatchResult, PipelineCoordinator};
pub use dedup::{
    DeduplicationEngine, Disposition, DuplicateCluster, FieldContribution, Fingerprint,
    FingerprintStore, InMemoryFingerprintStore, SimilarityScore,
};
pub use enrich::enrich_batch;
pub use transformer::Transformer;
pub use validator::{Diagnostic, ValidationOutcome, Validator};
