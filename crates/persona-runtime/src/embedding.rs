//! Embedding driver for vector-based memory retrieval.
//!
//! Provides an `EmbeddingDriver` trait and an OpenAI-compatible implementation
//! that works with any provider offering a `/v1/embeddings` endpoint (OpenAI,
//! Groq, Together, Fireworks, Ollama, etc.).

use async_trait::async_trait;
use persona_types::config::EmbeddingSettings;
use persona_types::error::PersonaError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroizing;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const TOGETHER_BASE_URL: &str = "https://api.together.xyz/v1";
pub const FIREWORKS_BASE_URL: &str = "https://api.fireworks.ai/inference/v1";
pub const MISTRAL_BASE_URL: &str = "https://api.mistral.ai/v1";
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";
pub const VLLM_BASE_URL: &str = "http://localhost:8000/v1";
pub const LMSTUDIO_BASE_URL: &str = "http://localhost:1234/v1";

/// Error type for embedding operations.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Missing API key: {0}")]
    MissingApiKey(String),
    #[error("Malformed embedding: {0}")]
    Malformed(String),
}

impl From<EmbeddingError> for PersonaError {
    fn from(err: EmbeddingError) -> Self {
        PersonaError::Embedding(err.to_string())
    }
}

/// Configuration for creating an embedding driver.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Provider name (openai, groq, together, ollama, etc.).
    pub provider: String,
    /// Model name (e.g., "text-embedding-3-small", "all-MiniLM-L6-v2").
    pub model: String,
    /// API key (resolved from env var).
    pub api_key: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Expected embedding width.
    pub dimensions: usize,
}

/// Trait for computing text embeddings.
#[async_trait]
pub trait EmbeddingDriver: Send + Sync {
    /// Compute embedding vectors for a batch of texts.
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Compute embedding for a single text.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let results = self.embed(&[text]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Parse("Empty embedding response".to_string()))
    }

    /// Return the dimensionality of embeddings produced by this driver.
    fn dimensions(&self) -> usize;
}

/// Reject vectors that cannot be stored or compared: empty, wrong width, or
/// containing NaN/infinite components.
pub fn check_embedding(embedding: &[f32], expected_dimensions: usize) -> Result<(), EmbeddingError> {
    if embedding.is_empty() {
        return Err(EmbeddingError::Malformed("empty vector".to_string()));
    }
    if embedding.len() != expected_dimensions {
        return Err(EmbeddingError::Malformed(format!(
            "expected {expected_dimensions} dimensions, got {}",
            embedding.len()
        )));
    }
    if let Some(pos) = embedding.iter().position(|v| !v.is_finite()) {
        return Err(EmbeddingError::Malformed(format!(
            "non-finite component at index {pos}"
        )));
    }
    Ok(())
}

/// OpenAI-compatible embedding driver.
///
/// Works with any provider that implements the `/v1/embeddings` endpoint:
/// OpenAI, Groq, Together, Fireworks, Ollama, vLLM, LM Studio, etc.
pub struct OpenAIEmbeddingDriver {
    provider: String,
    api_key: Zeroizing<String>,
    base_url: String,
    model: String,
    client: reqwest::Client,
    dims: usize,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAIEmbeddingDriver {
    /// Create a new OpenAI-compatible embedding driver.
    pub fn new(config: EmbeddingConfig) -> Result<Self, EmbeddingError> {
        Ok(Self {
            provider: config.provider,
            api_key: Zeroizing::new(config.api_key),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model,
            client: reqwest::Client::new(),
            dims: config.dimensions,
        })
    }

    /// Provider name this driver was configured for.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    fn request_body<'a>(&'a self, texts: &'a [&'a str]) -> EmbedRequest<'a> {
        EmbedRequest {
            model: &self.model,
            input: texts,
            dimensions: supports_dimensions_param(&self.model).then_some(self.dims),
        }
    }
}

/// `text-embedding-3-*` models can shorten their output to a requested width.
fn supports_dimensions_param(model: &str) -> bool {
    model.starts_with("text-embedding-3")
}

#[async_trait]
impl EmbeddingDriver for OpenAIEmbeddingDriver {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let url = format!("{}/embeddings", self.base_url);
        let body = self.request_body(texts);

        let mut req = self.client.post(&url).json(&body);
        if !self.api_key.as_str().is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.api_key.as_str()));
        }

        let resp = req
            .send()
            .await
            .map_err(|e| EmbeddingError::Http(e.to_string()))?;
        let status = resp.status().as_u16();

        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                status,
                message: format!("{}: {body_text}", self.provider),
            });
        }

        let mut data: EmbedResponse = resp
            .json()
            .await
            .map_err(|e| EmbeddingError::Parse(e.to_string()))?;

        if data.data.len() != texts.len() {
            return Err(EmbeddingError::Parse(format!(
                "requested {} embeddings, received {}",
                texts.len(),
                data.data.len()
            )));
        }

        data.data.sort_by_key(|d| d.index);
        let embeddings: Vec<Vec<f32>> = data.data.into_iter().map(|d| d.embedding).collect();

        debug!(
            provider = %self.provider,
            model = %self.model,
            "Embedded {} texts (dims={})",
            embeddings.len(),
            embeddings.first().map(|e| e.len()).unwrap_or(0)
        );

        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

/// Resolve the base URL for a provider name.
fn provider_base_url(provider: &str) -> String {
    match provider {
        "openai" => OPENAI_BASE_URL.to_string(),
        "groq" => GROQ_BASE_URL.to_string(),
        "together" => TOGETHER_BASE_URL.to_string(),
        "fireworks" => FIREWORKS_BASE_URL.to_string(),
        "mistral" => MISTRAL_BASE_URL.to_string(),
        "ollama" => OLLAMA_BASE_URL.to_string(),
        "vllm" => VLLM_BASE_URL.to_string(),
        "lmstudio" => LMSTUDIO_BASE_URL.to_string(),
        other => {
            warn!("Unknown embedding provider '{other}', using OpenAI-compatible format");
            format!("https://{other}/v1")
        }
    }
}

/// Create an embedding driver from the embedding settings.
pub fn create_embedding_driver(
    settings: &EmbeddingSettings,
) -> Result<Box<dyn EmbeddingDriver + Send + Sync>, EmbeddingError> {
    let api_key = if settings.api_key_env.is_empty() {
        String::new()
    } else {
        std::env::var(&settings.api_key_env).unwrap_or_default()
    };

    let base_url = settings
        .base_url
        .clone()
        .unwrap_or_else(|| provider_base_url(&settings.provider));

    let is_local = settings.is_local();
    if !is_local && api_key.is_empty() {
        return Err(EmbeddingError::MissingApiKey(format!(
            "set {} for provider '{}'",
            if settings.api_key_env.is_empty() {
                "embedding.api_key_env"
            } else {
                settings.api_key_env.as_str()
            },
            settings.provider
        )));
    }
    if !is_local {
        warn!(
            provider = %settings.provider,
            base_url = %base_url,
            "Embedding driver configured to send data to external API; memory text will leave this machine"
        );
    }

    let config = EmbeddingConfig {
        provider: settings.provider.clone(),
        model: settings.model.clone(),
        api_key,
        base_url,
        dimensions: settings.dimensions,
    };

    let driver = OpenAIEmbeddingDriver::new(config)?;
    Ok(Box::new(driver))
}
