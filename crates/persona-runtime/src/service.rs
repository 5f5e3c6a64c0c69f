//! Memory service: the boundary the HTTP and tool layers talk to.
//!
//! Failures are reported as structured results instead of errors. A failed
//! store says why; a failed retrieval behaves like "no memories found" so a
//! conversation can carry on without context.

use crate::embedding::EmbeddingDriver;
use crate::retriever::MemoryRetriever;
use crate::writer::MemoryWriter;
use persona_types::config::MemoryConfig;
use persona_types::error::{PersonaError, PersonaResult};
use persona_types::memory::{
    MemoryRecord, RecordStore, RetrieveOptions, RetrieveRequest, RetrieveResponse, StoreRequest,
    StoreResponse,
};
use std::sync::Arc;
use tracing::warn;

/// Store and retrieve memories, turning failures into boundary responses.
#[derive(Clone)]
pub struct MemoryService {
    writer: MemoryWriter,
    retriever: MemoryRetriever,
    store: Arc<dyn RecordStore>,
    defaults: RetrieveOptions,
}

impl MemoryService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        embedder: Arc<dyn EmbeddingDriver>,
        config: &MemoryConfig,
    ) -> Self {
        Self {
            writer: MemoryWriter::new(store.clone(), embedder.clone()),
            retriever: MemoryRetriever::new(store.clone(), embedder, config.similarity_metric),
            store,
            defaults: RetrieveOptions {
                top_k: config.default_top_k,
                min_similarity: config.default_min_similarity,
            },
        }
    }

    /// Retrieval options used when a request leaves them out.
    pub fn default_options(&self) -> RetrieveOptions {
        self.defaults
    }

    pub async fn store(&self, user_id: &str, memory_type: &str, content: &str) -> StoreResponse {
        match self.writer.store(user_id, memory_type, content).await {
            Ok(record) => StoreResponse::stored(record.id),
            Err(e) => {
                warn!(user_id, error = %e, kind = e.kind(), "Failed to store memory");
                StoreResponse::failed(&e)
            }
        }
    }

    pub async fn retrieve(
        &self,
        user_id: &str,
        query: &str,
        top_k: Option<usize>,
        min_similarity: Option<f32>,
    ) -> RetrieveResponse {
        let options = RetrieveOptions {
            top_k: top_k.unwrap_or(self.defaults.top_k),
            min_similarity: min_similarity.unwrap_or(self.defaults.min_similarity),
        };
        match self.retriever.retrieve(user_id, query, options).await {
            Ok(memories) => RetrieveResponse::found(memories),
            Err(e) => {
                warn!(user_id, error = %e, kind = e.kind(), "Failed to retrieve memories");
                RetrieveResponse::failed(&e)
            }
        }
    }

    pub async fn handle_store(&self, req: &StoreRequest) -> StoreResponse {
        self.store(&req.user_id, &req.memory_type, &req.content)
            .await
    }

    pub async fn handle_retrieve(&self, req: &RetrieveRequest) -> RetrieveResponse {
        self.retrieve(&req.user_id, &req.query, req.top_k, req.min_similarity)
            .await
    }

    /// Every memory stored for `user_id`, oldest first.
    pub async fn list(&self, user_id: &str) -> PersonaResult<Vec<MemoryRecord>> {
        if user_id.trim().is_empty() {
            return Err(PersonaError::Validation("userId is required".to_string()));
        }
        let store = self.store.clone();
        let owner = user_id.to_string();
        tokio::task::spawn_blocking(move || store.list_by_user(&owner))
            .await
            .map_err(|e| PersonaError::Internal(format!("store task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingError;
    use async_trait::async_trait;
    use persona_memory::SqliteRecordStore;

    /// Two topic axes plus a constant bias so no text embeds to zero.
    struct KeywordEmbedding;

    impl KeywordEmbedding {
        fn vector(text: &str) -> Vec<f32> {
            let mut v = vec![0.0, 0.0, 1.0];
            for word in text
                .to_lowercase()
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty())
            {
                match word {
                    "music" | "jazz" | "song" => v[0] += 1.0,
                    "like" | "likes" | "enjoy" => v[1] += 1.0,
                    _ => {}
                }
            }
            v
        }
    }

    #[async_trait]
    impl EmbeddingDriver for KeywordEmbedding {
        async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts.iter().map(|t| Self::vector(t)).collect())
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    struct DownEmbedding;

    #[async_trait]
    impl EmbeddingDriver for DownEmbedding {
        async fn embed(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Err(EmbeddingError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            })
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    fn service(embedder: Arc<dyn EmbeddingDriver>) -> MemoryService {
        let store = Arc::new(SqliteRecordStore::open_in_memory().unwrap());
        MemoryService::new(store, embedder, &MemoryConfig::default())
    }

    #[tokio::test]
    async fn test_store_then_retrieve_related_memory() {
        let svc = service(Arc::new(KeywordEmbedding));
        let stored = svc.store("u1", "interest", "likes jazz music").await;
        assert!(stored.success);
        assert_eq!(stored.message, "Memory stored successfully");
        assert!(stored.id.is_some());

        let resp = svc.retrieve("u1", "what music do I like?", None, None).await;
        assert!(resp.error.is_none());
        assert_eq!(resp.memories.len(), 1);
        let m = &resp.memories[0];
        assert_eq!(m.record.content, "likes jazz music");
        assert!(m.similarity > 0.5);
        assert!(m.time_relevance > 0.99);
    }

    #[tokio::test]
    async fn test_store_failure_is_reported() {
        let svc = service(Arc::new(KeywordEmbedding));
        let resp = svc.store("u1", "hobby", "plays chess").await;
        assert!(!resp.success);
        assert_eq!(resp.message, "Failed to store memory");
        assert_eq!(resp.error.as_deref(), Some("validation_failure"));
        assert!(resp.details.unwrap().contains("hobby"));
    }

    #[tokio::test]
    async fn test_retrieve_failure_degrades_to_empty() {
        let svc = service(Arc::new(DownEmbedding));
        let resp = svc.retrieve("u1", "music", None, None).await;
        assert!(resp.memories.is_empty());
        assert_eq!(resp.error.as_deref(), Some("embedding_failure"));
        assert!(resp.details.unwrap().contains("service unavailable"));
    }

    #[tokio::test]
    async fn test_retrieve_overrides_defaults() {
        let svc = service(Arc::new(KeywordEmbedding));
        for content in ["likes jazz", "enjoy a song", "likes music"] {
            assert!(svc.store("u1", "interest", content).await.success);
        }
        let resp = svc.retrieve("u1", "music", Some(2), Some(0.0)).await;
        assert_eq!(resp.memories.len(), 2);
        let resp = svc.retrieve("u1", "music", Some(0), None).await;
        assert!(resp.memories.is_empty());
        assert!(resp.error.is_none());
    }

    #[tokio::test]
    async fn test_handle_requests() {
        let svc = service(Arc::new(KeywordEmbedding));
        let req = StoreRequest {
            user_id: "u1".to_string(),
            memory_type: "key_point".to_string(),
            content: "likes jazz music".to_string(),
        };
        assert!(svc.handle_store(&req).await.success);

        let req = RetrieveRequest {
            user_id: "u1".to_string(),
            query: "music".to_string(),
            top_k: None,
            min_similarity: None,
        };
        let resp = svc.handle_retrieve(&req).await;
        assert_eq!(resp.memories.len(), 1);
    }

    #[tokio::test]
    async fn test_list_scoped_to_user() {
        let svc = service(Arc::new(KeywordEmbedding));
        svc.store("u1", "interest", "likes jazz").await;
        svc.store("u2", "interest", "likes blues").await;
        let records = svc.list("u1").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "likes jazz");
        assert!(svc.list(" ").await.is_err());
    }
}
