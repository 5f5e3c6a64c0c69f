//! Configuration types for the Persona daemon and CLI.

use crate::memory::{SimilarityMetric, DEFAULT_MIN_SIMILARITY, DEFAULT_TOP_K};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default embedding vector width; matches `text-embedding-3-small`.
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;

/// Top-level configuration, loaded from `~/.persona/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaConfig {
    /// Persona home directory.
    pub home_dir: PathBuf,
    /// Directory holding the SQLite database.
    pub data_dir: PathBuf,
    /// Fallback log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Address the API server binds to.
    pub api_listen: String,
    /// Memory store settings.
    pub memory: MemoryConfig,
    /// Embedding provider settings.
    pub embedding: EmbeddingSettings,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        let home_dir = persona_home_dir();
        Self {
            data_dir: home_dir.join("data"),
            home_dir,
            log_level: "info".to_string(),
            api_listen: "127.0.0.1:4300".to_string(),
            memory: MemoryConfig::default(),
            embedding: EmbeddingSettings::default(),
        }
    }
}

impl PersonaConfig {
    /// Path of the SQLite database, honoring an explicit override.
    pub fn sqlite_path(&self) -> PathBuf {
        self.memory
            .sqlite_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("memory.db"))
    }

    /// Check for settings that will fail at runtime. Returns one warning per problem.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.embedding.dimensions == 0 {
            warnings.push("embedding.dimensions is 0; every embedding will be rejected".to_string());
        }
        if self.embedding.model.trim().is_empty() {
            warnings.push("embedding.model is empty".to_string());
        }
        if self.memory.default_top_k == 0 {
            warnings.push("memory.default_top_k is 0; retrievals will always be empty".to_string());
        }
        if !(-1.0..=1.0).contains(&self.memory.default_min_similarity) {
            warnings.push(format!(
                "memory.default_min_similarity {} is outside [-1, 1]",
                self.memory.default_min_similarity
            ));
        }
        let local = self.embedding.is_local();
        if !local && self.embedding.api_key_env.trim().is_empty() {
            warnings.push(format!(
                "embedding.api_key_env is empty for remote provider '{}'",
                self.embedding.provider
            ));
        } else if !local && std::env::var(&self.embedding.api_key_env).is_err() {
            warnings.push(format!(
                "environment variable {} (embedding API key) is not set",
                self.embedding.api_key_env
            ));
        }

        warnings
    }
}

/// Memory store and retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Explicit SQLite path (defaults to `<data_dir>/memory.db`).
    pub sqlite_path: Option<PathBuf>,
    /// Distance metric used for similarity.
    pub similarity_metric: SimilarityMetric,
    /// Result count when the caller gives none.
    pub default_top_k: usize,
    /// Similarity threshold when the caller gives none.
    pub default_min_similarity: f32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            sqlite_path: None,
            similarity_metric: SimilarityMetric::Cosine,
            default_top_k: DEFAULT_TOP_K,
            default_min_similarity: DEFAULT_MIN_SIMILARITY,
        }
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Provider name (openai, groq, together, ollama, etc.).
    pub provider: String,
    /// Model name.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Overrides the provider's default base URL.
    pub base_url: Option<String>,
    /// Width of every embedding vector in this deployment.
    pub dimensions: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: None,
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

/// Providers whose default endpoint is on this machine.
const LOCAL_PROVIDERS: [&str; 3] = ["ollama", "vllm", "lmstudio"];

impl EmbeddingSettings {
    /// Whether embedding requests stay on this machine, in which case no API
    /// key is needed. An explicit `base_url` decides; otherwise the
    /// provider's default endpoint does.
    pub fn is_local(&self) -> bool {
        match &self.base_url {
            Some(url) => is_loopback_url(url),
            None => LOCAL_PROVIDERS.contains(&self.provider.as_str()),
        }
    }
}

/// True if `url` names a loopback host.
pub fn is_loopback_url(url: &str) -> bool {
    ["localhost", "127.0.0.1", "[::1]"]
        .iter()
        .any(|host| url.contains(host))
}

/// `~/.persona`, or a temp-dir fallback when no home directory exists.
pub fn persona_home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".persona")
}
