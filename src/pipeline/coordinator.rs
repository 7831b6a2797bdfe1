//! Pipeline coordinator
//!
//! Drives one batch through validate, transform, deduplicate, enrich, and
//! persist. Per-record failures never abort the batch; only a sink failure
//! stops persistence, and even then listings already written stay written.

use crate::config::Config;
use crate::pipeline::{
    enrich_batch, DeduplicationEngine, Disposition, FingerprintStore, InMemoryFingerprintStore,
    Transformer, Validator,
};
use crate::record::{Listing, RawListingRecord};
use crate::storage::ListingSink;
use chrono::{Datelike, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Counters and samples from one pipeline run
///
/// Invariants: `valid + invalid + not_processed == input` and
/// `persisted + not_persisted == valid - duplicates`.
#[derive(Debug, Clone, Default)]
pub struct PipelineBatchResult {
    /// Records handed to the run
    pub input: usize,
    /// Records that passed validation
    pub valid: usize,
    /// Records rejected by validation
    pub invalid: usize,
    /// Records classified as exact or fuzzy duplicates
    pub duplicates: usize,
    /// Listings that reached the enrichment stage
    pub enriched: usize,
    /// Listings written to the sink
    pub persisted: usize,
    /// Records never validated because the batch timed out
    pub not_processed: usize,
    /// Accepted listings left unwritten after a sink failure
    pub not_persisted: usize,
    /// Bounded sample of per-record error messages
    pub errors: Vec<String>,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

/// Runs batches of raw records through the full pipeline
pub struct PipelineCoordinator {
    validator: Validator,
    transformer: Transformer,
    dedup: DeduplicationEngine,
    sink: Arc<dyn ListingSink>,
    max_error_samples: usize,
    batch_timeout: Option<Duration>,
    reference_year: i32,
}

impl PipelineCoordinator {
    /// Creates a coordinator with the current year as reference
    pub fn new(config: &Config, sink: Arc<dyn ListingSink>) -> Self {
        Self::with_reference_year(config, sink, Utc::now().year())
    }

    /// Creates a coordinator with an explicit reference year (for tests)
    pub fn with_reference_year(
        config: &Config,
        sink: Arc<dyn ListingSink>,
        reference_year: i32,
    ) -> Self {
        let threshold = config.pipeline.price_thousands_threshold;
        let batch_timeout = match config.pipeline.batch_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Self {
            validator: Validator::new(config.validation.clone(), threshold, reference_year),
            transformer: Transformer::new(threshold, reference_year),
            dedup: DeduplicationEngine::new(config.dedup.clone()),
            sink,
            max_error_samples: config.pipeline.max_error_samples,
            batch_timeout,
            reference_year,
        }
    }

    #[cfg(test)]
    fn set_batch_timeout(&mut self, timeout: Duration) {
        self.batch_timeout = Some(timeout);
    }

    /// Runs a batch with a fresh fingerprint store scoped to this run
    pub fn run(&self, batch: Vec<RawListingRecord>) -> PipelineBatchResult {
        let store = InMemoryFingerprintStore::new();
        self.run_with_store(batch, &store)
    }

    /// Runs a batch against a caller-owned fingerprint store
    ///
    /// Sharing one store across runs extends exact-duplicate detection
    /// across batches.
    pub fn run_with_store(
        &self,
        batch: Vec<RawListingRecord>,
        store: &dyn FingerprintStore,
    ) -> PipelineBatchResult {
        let start = Instant::now();
        let deadline = self.batch_timeout.map(|timeout| start + timeout);

        let mut result = PipelineBatchResult {
            input: batch.len(),
            ..Default::default()
        };
        let mut accepted: Vec<Listing> = Vec::new();

        for (index, record) in batch.into_iter().enumerate() {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    result.not_processed = result.input - index;
                    warn!(
                        remaining = result.not_processed,
                        "batch timeout hit, skipping remaining records"
                    );
                    break;
                }
            }

            let outcome = self.validator.validate(&record);
            if !outcome.is_valid() {
                result.invalid += 1;
                for diagnostic in &outcome.diagnostics {
                    self.sample_error(
                        &mut result,
                        format!(
                            "{}/{}: {}: {}",
                            record.source, record.external_id, diagnostic.field, diagnostic.message
                        ),
                    );
                }
                continue;
            }
            result.valid += 1;

            let listing = self.transformer.transform(&record);

            match self.dedup.classify(&listing, store, &accepted) {
                Disposition::Unique => accepted.push(listing),
                Disposition::ExactDuplicate => {
                    debug!(
                        external_id = %listing.external_id,
                        "dropping exact duplicate"
                    );
                    result.duplicates += 1;
                }
                Disposition::FuzzyDuplicate { matched, score } => {
                    debug!(
                        external_id = %listing.external_id,
                        score = score.score,
                        "merging fuzzy duplicate"
                    );
                    accepted[matched] = self.dedup.merge(&accepted[matched], &listing);
                    result.duplicates += 1;
                }
            }
        }

        enrich_batch(&mut accepted, self.reference_year);
        result.enriched = accepted.len();

        for (index, listing) in accepted.iter().enumerate() {
            match self.sink.persist(listing) {
                Ok(()) => result.persisted += 1,
                Err(e) => {
                    self.sample_error(
                        &mut result,
                        format!("sink failure at {}: {e}", listing.external_id),
                    );
                    result.not_persisted = accepted.len() - index;
                    warn!("sink failure, aborting persistence: {e}");
                    break;
                }
            }
        }

        result.elapsed = start.elapsed();
        info!(
            input = result.input,
            valid = result.valid,
            invalid = result.invalid,
            duplicates = result.duplicates,
            persisted = result.persisted,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "pipeline run finished"
        );
        result
    }

    fn sample_error(&self, result: &mut PipelineBatchResult, message: String) {
        if result.errors.len() < self.max_error_samples {
            result.errors.push(message);
        }
    }
}
