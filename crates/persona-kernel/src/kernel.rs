//! PersonaKernel: owns the configuration and the memory service built from it.

use crate::config::load_config;
use crate::error::{KernelError, KernelResult};
use persona_memory::SqliteRecordStore;
use persona_runtime::embedding::{create_embedding_driver, EmbeddingDriver};
use persona_runtime::MemoryService;
use persona_types::config::PersonaConfig;
use persona_types::memory::RecordStore;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// The booted system, shared by the API server and the CLI.
pub struct PersonaKernel {
    pub config: PersonaConfig,
    pub memory: MemoryService,
}

impl PersonaKernel {
    /// Load configuration from `config_path` (or the default location) and boot.
    pub fn boot(config_path: Option<&Path>) -> KernelResult<Self> {
        Self::boot_with_config(load_config(config_path))
    }

    /// Open the store, pin the embedding width, and connect the embedding provider.
    pub fn boot_with_config(config: PersonaConfig) -> KernelResult<Self> {
        for warning in config.validate() {
            warn!("{warning}");
        }

        let db_path = config.sqlite_path();
        let store = SqliteRecordStore::open(&db_path)?;
        store.ensure_embedding_dimensions(config.embedding.dimensions)?;

        let driver = create_embedding_driver(&config.embedding).map_err(|e| {
            KernelError::BootFailed(format!(
                "embedding provider '{}': {e}",
                config.embedding.provider
            ))
        })?;
        let embedder: Arc<dyn EmbeddingDriver + Send + Sync> = Arc::from(driver);

        info!(
            db = %db_path.display(),
            provider = %config.embedding.provider,
            model = %config.embedding.model,
            dimensions = config.embedding.dimensions,
            "Persona kernel booted"
        );
        Ok(Self::with_components(config, Arc::new(store), embedder))
    }

    /// Assemble a kernel from already-built parts.
    pub fn with_components(
        config: PersonaConfig,
        store: Arc<dyn RecordStore>,
        embedder: Arc<dyn EmbeddingDriver>,
    ) -> Self {
        let memory = MemoryService::new(store, embedder, &config.memory);
        Self { config, memory }
    }
}
