//! Memory writer: validates a new memory, embeds it, and appends it to the store.

use crate::embedding::{check_embedding, EmbeddingDriver};
use chrono::Utc;
use persona_types::error::{PersonaError, PersonaResult};
use persona_types::memory::{MemoryRecord, MemoryType, NewMemoryRecord, RecordStore};
use std::sync::Arc;
use tracing::{debug, info};

/// Sole producer of memory records.
#[derive(Clone)]
pub struct MemoryWriter {
    store: Arc<dyn RecordStore>,
    embedder: Arc<dyn EmbeddingDriver>,
}

impl MemoryWriter {
    pub fn new(store: Arc<dyn RecordStore>, embedder: Arc<dyn EmbeddingDriver>) -> Self {
        Self { store, embedder }
    }

    /// Store a memory whose type arrives as a free-form tag.
    ///
    /// The tag must be one of the recognized memory types; anything else is a
    /// validation failure.
    pub async fn store(
        &self,
        user_id: &str,
        memory_type: &str,
        content: &str,
    ) -> PersonaResult<MemoryRecord> {
        require_non_empty("userId", user_id)?;
        require_non_empty("content", content)?;
        let memory_type: MemoryType = memory_type.parse()?;
        self.store_typed(user_id, memory_type, content).await
    }

    /// Store a memory of a known type. Every call appends a new record, even
    /// for content already stored.
    pub async fn store_typed(
        &self,
        user_id: &str,
        memory_type: MemoryType,
        content: &str,
    ) -> PersonaResult<MemoryRecord> {
        require_non_empty("userId", user_id)?;
        require_non_empty("content", content)?;

        let embedding = self.embedder.embed_one(content).await?;
        check_embedding(&embedding, self.embedder.dimensions())?;
        debug!(user_id, dims = embedding.len(), "Embedded memory content");

        let record = NewMemoryRecord {
            user_id: user_id.to_string(),
            memory_type,
            content: content.to_string(),
            embedding,
            created_at: Utc::now(),
        };
        let store = self.store.clone();
        let stored = tokio::task::spawn_blocking(move || store.insert(record))
            .await
            .map_err(|e| PersonaError::Internal(format!("store task failed: {e}")))??;

        info!(
            id = %stored.id,
            user_id,
            memory_type = %memory_type,
            content_len = content.len(),
            "Stored memory"
        );
        Ok(stored)
    }
}

/// Whitespace-only values count as missing.
pub(crate) fn require_non_empty(field: &str, value: &str) -> PersonaResult<()> {
    if value.trim().is_empty() {
        return Err(PersonaError::Validation(format!("{field} is required")));
    }
    Ok(())
}
