//! Relevance ranking of a user's memories against a query embedding.
//!
//! Every candidate gets:
//! - `similarity = 1 - distance(query, memory)`
//! - `time_relevance = 1 - age_days / 30` (unclamped, negative past 30 days)
//! - `combined_score = 0.8 * similarity + 0.2 * time_relevance`
//!
//! Candidates at or below the similarity threshold are dropped, the rest are
//! stably sorted by combined score (ties keep insertion order) and cut to `top_k`.

use chrono::{DateTime, Utc};
use persona_types::memory::{MemoryRecord, RetrieveOptions, ScoredMemory, SimilarityMetric};
use tracing::{debug, warn};

/// Weight of semantic similarity in the combined score.
pub const SIMILARITY_WEIGHT: f32 = 0.8;

/// Weight of time relevance in the combined score.
pub const TIME_RELEVANCE_WEIGHT: f32 = 0.2;

/// Age at which time relevance reaches zero.
pub const DECAY_HORIZON_DAYS: f64 = 30.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1.0, 1.0] where 1.0 = identical direction. Identical
/// vectors score exactly 1.0. Empty, mismatched, or zero-magnitude inputs
/// score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    // sqrt(n * n) == n exactly, so a vector compared with itself yields 1.0.
    let denom = (norm_a * norm_b).sqrt();
    if denom < f64::EPSILON {
        0.0
    } else {
        (dot / denom).clamp(-1.0, 1.0) as f32
    }
}

/// Euclidean (L2) distance between two vectors of equal length.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt() as f32
}

/// `1 - distance(a, b)` under `metric`. Symmetric in `a` and `b`.
///
/// Empty or mismatched vectors have no meaningful distance and score 0.0.
pub fn similarity(metric: SimilarityMetric, a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    match metric {
        SimilarityMetric::Cosine => {
            let cosine_distance = 1.0 - cosine_similarity(a, b);
            1.0 - cosine_distance
        }
        SimilarityMetric::Euclidean => 1.0 - euclidean_distance(a, b),
    }
}

/// Linear recency factor: 1.0 for a memory created at `now`, 0.0 at 30 days,
/// negative beyond. Not clamped in either direction.
pub fn time_relevance(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f32 {
    let age_days = (now - created_at).num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY;
    (1.0 - age_days / DECAY_HORIZON_DAYS) as f32
}

/// Weighted blend used for ranking.
pub fn combined_score(similarity: f32, time_relevance: f32) -> f32 {
    SIMILARITY_WEIGHT * similarity + TIME_RELEVANCE_WEIGHT * time_relevance
}

/// Score, filter, and rank `candidates` against `query`.
///
/// `candidates` must be in insertion order; that order breaks score ties.
/// Candidates whose embedding width differs from the query are skipped.
pub fn rank_candidates(
    query: &[f32],
    candidates: Vec<MemoryRecord>,
    options: RetrieveOptions,
    metric: SimilarityMetric,
    now: DateTime<Utc>,
) -> Vec<ScoredMemory> {
    if options.top_k == 0 {
        return Vec::new();
    }

    let candidate_count = candidates.len();
    let mut scored: Vec<ScoredMemory> = candidates
        .into_iter()
        .filter_map(|record| {
            if record.embedding.len() != query.len() {
                warn!(
                    id = %record.id,
                    stored = record.embedding.len(),
                    query = query.len(),
                    "Skipping memory with mismatched embedding width"
                );
                return None;
            }
            let similarity = similarity(metric, query, &record.embedding);
            // A NaN on either side compares false, so nothing passes.
            if similarity.is_nan()
                || options.min_similarity.is_nan()
                || similarity <= options.min_similarity
            {
                return None;
            }
            let time_relevance = time_relevance(record.created_at, now);
            Some(ScoredMemory {
                combined_score: combined_score(similarity, time_relevance),
                similarity,
                time_relevance,
                record,
            })
        })
        .collect();

    scored.sort_by(|a, b| b.combined_score.total_cmp(&a.combined_score));
    scored.truncate(options.top_k);

    debug!(
        candidates = candidate_count,
        returned = scored.len(),
        top_k = options.top_k,
        min_similarity = options.min_similarity,
        "Ranked memories"
    );

    scored
}
