//! Duplicate detection and merging
//!
//! Two layers of detection: an exact layer built on address fingerprints,
//! and a fuzzy layer built on weighted field similarity. The fingerprint
//! store is injected so callers choose its lifetime; the default in-memory
//! store lives for one pipeline run.

use crate::config::DedupConfig;
use crate::normalize::abbreviate_street;
use crate::record::Listing;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Mutex;

/// Upper bound on fuzzy comparisons per record
const MAX_CANDIDATES: usize = 100;

/// Hex SHA-256 of a listing's normalized address
///
/// A pure function of the address: lowercased, whitespace-collapsed,
/// street-suffix-abbreviated "street|city|state|zip".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Computes the fingerprint for a listing
    pub fn of(listing: &Listing) -> Self {
        let normalize = |value: &Option<String>| {
            value
                .as_deref()
                .unwrap_or("")
                .to_lowercase()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        };

        let street = abbreviate_street(&normalize(&listing.street_address)).to_lowercase();
        let key = format!(
            "{}|{}|{}|{}",
            street,
            normalize(&listing.city),
            normalize(&listing.state),
            normalize(&listing.zip_code),
        );

        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        Fingerprint(hex::encode(hasher.finalize()))
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

/// Set of fingerprints already seen
///
/// `check_and_insert` must be atomic: two concurrent calls with the same
/// fingerprint must not both report it as new.
pub trait FingerprintStore: Send + Sync {
    /// Inserts the fingerprint, returning true if it was not seen before
    fn check_and_insert(&self, fingerprint: &Fingerprint) -> bool;

    /// Number of distinct fingerprints stored
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Default store: a mutex-guarded in-memory set scoped to one run
#[derive(Default)]
pub struct InMemoryFingerprintStore {
    seen: Mutex<HashSet<String>>,
}

impl InMemoryFingerprintStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FingerprintStore for InMemoryFingerprintStore {
    fn check_and_insert(&self, fingerprint: &Fingerprint) -> bool {
        self.seen
            .lock()
            .expect("fingerprint store lock poisoned")
            .insert(fingerprint.0.clone())
    }

    fn len(&self) -> usize {
        self.seen
            .lock()
            .expect("fingerprint store lock poisoned")
            .len()
    }
}

/// One field's contribution to a composite similarity score
#[derive(Debug, Clone, PartialEq)]
pub struct FieldContribution {
    pub field: &'static str,
    pub similarity: f64,
    pub weight: f64,
}

/// Composite similarity between two listings
#[derive(Debug, Clone)]
pub struct SimilarityScore {
    /// Weighted score in [0, 1]
    pub score: f64,
    /// Per-field breakdown, only fields present on both sides
    pub contributions: Vec<FieldContribution>,
}

/// How the engine classified one listing
#[derive(Debug, Clone)]
pub enum Disposition {
    /// Not a duplicate of anything seen so far
    Unique,
    /// Same normalized address fingerprint as an earlier listing
    ExactDuplicate,
    /// Similar enough to an earlier listing to count as the same property
    FuzzyDuplicate {
        /// Index of the match in the accepted pool
        matched: usize,
        score: SimilarityScore,
    },
}

/// Detects exact and fuzzy duplicate listings
pub struct DeduplicationEngine {
    config: DedupConfig,
}

impl DeduplicationEngine {
    pub fn new(config: DedupConfig) -> Self {
        Self { config }
    }

    /// Classifies a listing against the store and a pool of accepted listings
    ///
    /// Every listing gets exactly one disposition. The fingerprint is
    /// inserted as a side effect, so a later identical address reports
    /// `ExactDuplicate`.
    pub fn classify(
        &self,
        listing: &Listing,
        store: &dyn FingerprintStore,
        accepted: &[Listing],
    ) -> Disposition {
        let fingerprint = Fingerprint::of(listing);
        if !store.check_and_insert(&fingerprint) {
            return Disposition::ExactDuplicate;
        }

        for index in self.candidate_pool(listing, accepted) {
            let score = self.similarity(listing, &accepted[index]);
            if score.score >= self.config.similarity_threshold {
                return Disposition::FuzzyDuplicate {
                    matched: index,
                    score,
                };
            }
        }

        Disposition::Unique
    }

    /// Geography-scoped candidate selection
    ///
    /// Only listings sharing a zip code, or both city and state, are worth a
    /// full similarity pass. Bounded to keep per-record cost flat.
    fn candidate_pool(&self, listing: &Listing, accepted: &[Listing]) -> Vec<usize> {
        let same_area = |candidate: &Listing| {
            if listing.zip_code.is_some() && listing.zip_code == candidate.zip_code {
                return true;
            }
            listing.city.is_some()
                && listing.city == candidate.city
                && listing.state == candidate.state
        };

        accepted
            .iter()
            .enumerate()
            .filter(|(_, c)| same_area(c))
            .map(|(i, _)| i)
            .take(MAX_CANDIDATES)
            .collect()
    }

    /// Weighted similarity over the fields present on both listings
    ///
    /// Missing fields are excluded and the remaining weights renormalized;
    /// two listings with no comparable fields score 0.
    pub fn similarity(&self, a: &Listing, b: &Listing) -> SimilarityScore {
        let mut contributions = Vec::new();

        let mut push_string =
            |field: &'static str, left: &Option<String>, right: &Option<String>, weight: f64| {
                if let (Some(left), Some(right)) = (left, right) {
                    contributions.push(FieldContribution {
                        field,
                        similarity: string_similarity(left, right),
                        weight,
                    });
                }
            };

        push_string(
            "street_address",
            &a.street_address,
            &b.street_address,
            self.config.street_weight,
        );
        push_string("city", &a.city, &b.city, self.config.city_weight);
        push_string("state", &a.state, &b.state, self.config.state_weight);
        push_string("zip_code", &a.zip_code, &b.zip_code, self.config.zip_weight);

        if let (Some(left), Some(right)) = (a.bedrooms, b.bedrooms) {
            contributions.push(FieldContribution {
                field: "bedrooms",
                similarity: if left == right { 1.0 } else { 0.0 },
                weight: self.config.bedrooms_weight,
            });
        }

        if let (Some(left), Some(right)) = (a.bathrooms, b.bathrooms) {
            contributions.push(FieldContribution {
                field: "bathrooms",
                similarity: if (left - right).abs() <= 0.5 {
                    1.0
                } else {
                    ratio_similarity(left, right, 0.1)
                },
                weight: self.config.bathrooms_weight,
            });
        }

        if let (Some(left), Some(right)) = (a.square_feet, b.square_feet) {
            contributions.push(FieldContribution {
                field: "square_feet",
                similarity: ratio_similarity(left as f64, right as f64, 0.1),
                weight: self.config.square_feet_weight,
            });
        }

        let total_weight: f64 = contributions.iter().map(|c| c.weight).sum();
        let score = if total_weight > 0.0 {
            contributions
                .iter()
                .map(|c| c.similarity * c.weight)
                .sum::<f64>()
                / total_weight
        } else {
            0.0
        };

        SimilarityScore {
            score,
            contributions,
        }
    }

    /// Groups a batch into duplicate clusters
    ///
    /// Each unprocessed listing seeds a cluster and is compared against
    /// every later listing; matches join the seed's cluster. Membership is
    /// decided against the seed, not transitively.
    pub fn cluster_batch(&self, listings: &[Listing]) -> Vec<DuplicateCluster> {
        let mut clusters = Vec::new();
        let mut clustered: HashSet<usize> = HashSet::new();

        for i in 0..listings.len() {
            if clustered.contains(&i) {
                continue;
            }

            let mut members = vec![i];
            for (j, other) in listings.iter().enumerate().skip(i + 1) {
                if clustered.contains(&j) {
                    continue;
                }
                if self.similarity(&listings[i], other).score >= self.config.similarity_threshold {
                    members.push(j);
                    clustered.insert(j);
                }
            }

            if members.len() > 1 {
                clustered.extend(members.iter().copied());
                let merged = members
                    .iter()
                    .skip(1)
                    .fold(listings[members[0]].clone(), |acc, &idx| {
                        self.merge(&acc, &listings[idx])
                    });
                clusters.push(DuplicateCluster { members, merged });
            }
        }

        clusters
    }

    /// Merges a duplicate into a base listing, preferring completeness
    ///
    /// Missing fields fill from the other side; the longer description wins;
    /// images and features union (base feature values win); the first
    /// non-zero price is kept.
    pub fn merge(&self, base: &Listing, other: &Listing) -> Listing {
        let mut merged = base.clone();

        fill(&mut merged.street_address, &other.street_address);
        fill(&mut merged.city, &other.city);
        fill(&mut merged.state, &other.state);
        fill(&mut merged.zip_code, &other.zip_code);
        fill_num(&mut merged.latitude, other.latitude);
        fill_num(&mut merged.longitude, other.longitude);
        fill_num(&mut merged.bedrooms, other.bedrooms);
        fill_num(&mut merged.bathrooms, other.bathrooms);
        fill_num(&mut merged.square_feet, other.square_feet);
        fill_num(&mut merged.lot_size, other.lot_size);
        fill_num(&mut merged.year_built, other.year_built);

        match (&merged.description, &other.description) {
            (None, Some(_)) => merged.description = other.description.clone(),
            (Some(current), Some(candidate)) if candidate.len() > current.len() => {
                merged.description = other.description.clone();
            }
            _ => {}
        }

        for image in &other.images {
            if !merged.images.contains(image) {
                merged.images.push(image.clone());
            }
        }

        for (name, value) in &other.features {
            merged.features.entry(name.clone()).or_insert(*value);
        }

        if merged.price_cents.unwrap_or(0) == 0 && other.price_cents.unwrap_or(0) != 0 {
            merged.price_cents = other.price_cents;
        }
        if merged.rent_estimate_cents.unwrap_or(0) == 0
            && other.rent_estimate_cents.unwrap_or(0) != 0
        {
            merged.rent_estimate_cents = other.rent_estimate_cents;
        }

        merged.quality_score = merged.quality_score.max(other.quality_score);
        merged
    }
}

/// A group of batch indices judged to be the same property
#[derive(Debug, Clone)]
pub struct DuplicateCluster {
    /// Indices into the batch, seed first
    pub members: Vec<usize>,
    /// All members merged into one listing
    pub merged: Listing,
}

fn fill(target: &mut Option<String>, source: &Option<String>) {
    if target.as_deref().map_or(true, str::is_empty) {
        if let Some(value) = source {
            if !value.is_empty() {
                *target = Some(value.clone());
            }
        }
    }
}

fn fill_num<T: Copy>(target: &mut Option<T>, source: Option<T>) {
    if target.is_none() {
        *target = source;
    }
}

/// Normalized edit-distance similarity in [0, 1]
fn string_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let a = a.trim();
    let b = b.trim();

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let distance = levenshtein(a, b);
    let max_len = a.chars().count().max(b.chars().count());
    1.0 - distance as f64 / max_len as f64
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Tolerance-band similarity for continuous values
///
/// Within the tolerance the values count as identical; past it the score
/// collapses linearly to 0 as the relative difference approaches 100%.
fn ratio_similarity(a: f64, b: f64, tolerance: f64) -> f64 {
    if a == b {
        return 1.0;
    }

    let max_val = a.abs().max(b.abs());
    if max_val == 0.0 {
        return 1.0;
    }

    let difference_ratio = (a - b).abs() / max_val;
    if difference_ratio <= tolerance {
        1.0
    } else {
        (1.0 - (difference_ratio - tolerance) / (1.0 - tolerance)).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SourceId;
    use chrono::Utc;

    fn create_test_listing(external_id: &str, street: &str) -> Listing {
        let mut listing = Listing::new(
            SourceId::Zillow,
            external_id.to_string(),
            format!("https://example.com/{external_id}"),
            Utc::now(),
        );
        listing.street_address = Some(street.to_string());
        listing.city = Some("Austin".to_string());
        listing.state = Some("TX".to_string());
        listing.zip_code = Some("78701".to_string());
        listing.bedrooms = Some(3);
        listing.bathrooms = Some(2.0);
        listing.square_feet = Some(1800);
        listing
    }

    fn create_test_engine() -> DeduplicationEngine {
        DeduplicationEngine::new(DedupConfig::default())
    }

    #[test]
    fn test_fingerprint_is_pure() {
        let listing = create_test_listing("z1", "123 Main St");
        assert_eq!(Fingerprint::of(&listing), Fingerprint::of(&listing));
    }

    #[test]
    fn test_fingerprint_normalizes_suffix_and_case() {
        let a = create_test_listing("z1", "123 Main Street");
        let b = create_test_listing("z2", "123 MAIN ST");
        assert_eq!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn test_fingerprint_distinguishes_addresses() {
        let a = create_test_listing("z1", "123 Main St");
        let b = create_test_listing("z2", "125 Main St");
        assert_ne!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn test_exact_duplicate_via_store() {
        let engine = create_test_engine();
        let store = InMemoryFingerprintStore::new();

        let first = create_test_listing("z1", "123 Main Street");
        let second = create_test_listing("r9", "123 main st");

        assert!(matches!(
            engine.classify(&first, &store, &[]),
            Disposition::Unique
        ));
        assert!(matches!(
            engine.classify(&second, &store, &[]),
            Disposition::ExactDuplicate
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_fuzzy_duplicate_near_identical() {
        let engine = create_test_engine();
        let store = InMemoryFingerprintStore::new();

        let first = create_test_listing("z1", "123 Main St");
        let second = create_test_listing("r2", "123 Main Str");

        let accepted = vec![first];
        match engine.classify(&second, &store, &accepted) {
            Disposition::FuzzyDuplicate { matched, score } => {
                assert_eq!(matched, 0);
                assert!(score.score >= 0.85);
                assert!(!score.contributions.is_empty());
            }
            other => panic!("expected fuzzy duplicate, got {other:?}"),
        }
    }

    #[test]
    fn test_different_property_is_unique() {
        let engine = create_test_engine();
        let store = InMemoryFingerprintStore::new();

        let first = create_test_listing("z1", "123 Main St");
        let mut second = create_test_listing("z2", "987 Oak Ave");
        second.bedrooms = Some(5);
        second.square_feet = Some(3200);

        let accepted = vec![first];
        assert!(matches!(
            engine.classify(&second, &store, &accepted),
            Disposition::Unique
        ));
    }

    #[test]
    fn test_similarity_renormalizes_missing_fields() {
        let engine = create_test_engine();
        let mut a = create_test_listing("z1", "123 Main St");
        let mut b = create_test_listing("z2", "123 Main St");
        a.square_feet = None;
        b.bathrooms = None;

        let score = engine.similarity(&a, &b);
        // All comparable fields agree, so renormalization keeps a full score
        assert!((score.score - 1.0).abs() < 1e-9);
        assert!(score
            .contributions
            .iter()
            .all(|c| c.field != "square_feet" && c.field != "bathrooms"));
    }

    #[test]
    fn test_similarity_zero_when_nothing_comparable() {
        let engine = create_test_engine();
        let a = Listing::new(
            SourceId::Zillow,
            "z1".to_string(),
            "https://example.com/1".to_string(),
            Utc::now(),
        );
        let b = a.clone();
        assert_eq!(engine.similarity(&a, &b).score, 0.0);
    }

    #[test]
    fn test_candidate_pool_scoped_by_geography() {
        let engine = create_test_engine();
        let store = InMemoryFingerprintStore::new();

        let mut elsewhere = create_test_listing("z1", "123 Main St");
        elsewhere.city = Some("Dallas".to_string());
        elsewhere.zip_code = Some("75201".to_string());

        // Identical street but different geography: not even compared
        let listing = create_test_listing("z2", "123 Main St");
        let accepted = vec![elsewhere];
        assert!(matches!(
            engine.classify(&listing, &store, &accepted),
            Disposition::Unique
        ));
    }

    #[test]
    fn test_merge_prefers_completeness() {
        let engine = create_test_engine();

        let mut base = create_test_listing("z1", "123 Main St");
        base.description = Some("Nice".to_string());
        base.price_cents = None;
        base.images = vec!["a.jpg".to_string()];
        base.features.insert("pool".to_string(), false);

        let mut other = create_test_listing("z2", "123 Main Street");
        other.description = Some("Nice home with a large yard".to_string());
        other.price_cents = Some(45_000_000);
        other.year_built = Some(1990);
        other.images = vec!["a.jpg".to_string(), "b.jpg".to_string()];
        other.features.insert("pool".to_string(), true);
        other.features.insert("garage".to_string(), true);

        let merged = engine.merge(&base, &other);
        assert_eq!(merged.description.as_deref(), Some("Nice home with a large yard"));
        assert_eq!(merged.price_cents, Some(45_000_000));
        assert_eq!(merged.year_built, Some(1990));
        assert_eq!(merged.images, vec!["a.jpg".to_string(), "b.jpg".to_string()]);
        // Base feature value wins on conflict
        assert_eq!(merged.features.get("pool"), Some(&false));
        assert_eq!(merged.features.get("garage"), Some(&true));
        // Merge keeps the base street, not the duplicate's variant
        assert_eq!(merged.street_address.as_deref(), Some("123 Main St"));
    }

    #[test]
    fn test_cluster_batch_is_seed_based() {
        let engine = create_test_engine();

        let a = create_test_listing("z1", "123 Main St");
        let b = create_test_listing("z2", "123 Main Str");
        let mut c = create_test_listing("z3", "987 Oak Ave");
        c.bedrooms = Some(5);
        c.square_feet = Some(3200);

        let clusters = engine.cluster_batch(&[a, b, c]);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members, vec![0, 1]);
    }
}
