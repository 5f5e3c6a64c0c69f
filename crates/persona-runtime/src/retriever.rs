//! Memory retriever: embeds a query and ranks one user's memories against it.

use crate::embedding::{check_embedding, EmbeddingDriver};
use crate::writer::require_non_empty;
use chrono::Utc;
use persona_memory::ranking::rank_candidates;
use persona_types::error::{PersonaError, PersonaResult};
use persona_types::memory::{RecordStore, RetrieveOptions, ScoredMemory, SimilarityMetric};
use std::sync::Arc;
use tracing::debug;

/// Read-only view over the record store that returns the memories most
/// relevant to a query.
#[derive(Clone)]
pub struct MemoryRetriever {
    store: Arc<dyn RecordStore>,
    embedder: Arc<dyn EmbeddingDriver>,
    metric: SimilarityMetric,
}

impl MemoryRetriever {
    pub fn new(
        store: Arc<dyn RecordStore>,
        embedder: Arc<dyn EmbeddingDriver>,
        metric: SimilarityMetric,
    ) -> Self {
        Self {
            store,
            embedder,
            metric,
        }
    }

    /// Return at most `options.top_k` of `user_id`'s memories whose similarity
    /// to `query` exceeds `options.min_similarity`, best first.
    ///
    /// Only `user_id`'s records are ever considered. No matches is an empty
    /// result, not an error. A NaN or infinite `min_similarity` is a
    /// validation failure.
    pub async fn retrieve(
        &self,
        user_id: &str,
        query: &str,
        options: RetrieveOptions,
    ) -> PersonaResult<Vec<ScoredMemory>> {
        require_non_empty("userId", user_id)?;
        require_non_empty("query", query)?;
        if !options.min_similarity.is_finite() {
            return Err(PersonaError::Validation(format!(
                "minSimilarity must be a finite number, got {}",
                options.min_similarity
            )));
        }

        let query_embedding = self.embedder.embed_one(query).await?;
        check_embedding(&query_embedding, self.embedder.dimensions())?;

        let store = self.store.clone();
        let owner = user_id.to_string();
        let candidates = tokio::task::spawn_blocking(move || store.list_by_user(&owner))
            .await
            .map_err(|e| PersonaError::Internal(format!("store task failed: {e}")))??;
        debug!(
            user_id,
            candidates = candidates.len(),
            query_len = query.len(),
            "Loaded candidates"
        );

        Ok(rank_candidates(
            &query_embedding,
            candidates,
            options,
            self.metric,
            Utc::now(),
        ))
    }
}
