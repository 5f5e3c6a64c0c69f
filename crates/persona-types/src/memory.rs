//! Memory record types, retrieval options, boundary results, and the
//! `RecordStore` trait implemented by storage backends.

use crate::error::{PersonaError, PersonaResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default number of memories returned by a retrieval.
pub const DEFAULT_TOP_K: usize = 5;

/// Default similarity a candidate must exceed to be returned.
pub const DEFAULT_MIN_SIMILARITY: f32 = 0.5;

/// Identifier of a stored memory, assigned monotonically by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryId(pub i64);

impl std::fmt::Display for MemoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of fact a memory records about the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryType {
    /// Something the user is interested in.
    Interest,
    /// Something the user wants to learn.
    LearningGoal,
    /// How much the user already knows about a topic.
    KnowledgeLevel,
    /// A notable point from a conversation.
    KeyPoint,
}

impl MemoryType {
    /// Every recognized memory type, in declaration order.
    pub const ALL: [MemoryType; 4] = [
        MemoryType::Interest,
        MemoryType::LearningGoal,
        MemoryType::KnowledgeLevel,
        MemoryType::KeyPoint,
    ];

    /// The tag stored in the `type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryType::Interest => "interest",
            MemoryType::LearningGoal => "learning_goal",
            MemoryType::KnowledgeLevel => "knowledge_level",
            MemoryType::KeyPoint => "key_point",
        }
    }
}

impl std::fmt::Display for MemoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryType {
    type Err = PersonaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "interest" => Ok(MemoryType::Interest),
            "learning_goal" => Ok(MemoryType::LearningGoal),
            "knowledge_level" => Ok(MemoryType::KnowledgeLevel),
            "key_point" => Ok(MemoryType::KeyPoint),
            other => Err(PersonaError::Validation(format!(
                "unrecognized memory type '{other}' (expected one of: interest, learning_goal, knowledge_level, key_point)"
            ))),
        }
    }
}

/// A persisted, immutable memory about a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Store-assigned ID.
    pub id: MemoryId,
    /// Owner of this memory.
    pub user_id: String,
    /// Kind of fact recorded.
    #[serde(rename = "type")]
    pub memory_type: MemoryType,
    /// Human-readable memory text.
    pub content: String,
    /// Embedding of `content`, computed once at write time.
    #[serde(default, skip_serializing)]
    pub embedding: Vec<f32>,
    /// When the memory was stored.
    pub created_at: DateTime<Utc>,
}

/// A memory about to be inserted. The store assigns the ID.
#[derive(Debug, Clone)]
pub struct NewMemoryRecord {
    pub user_id: String,
    pub memory_type: MemoryType,
    pub content: String,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

/// A retrieved memory together with the scores that ranked it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMemory {
    #[serde(flatten)]
    pub record: MemoryRecord,
    /// `1 - distance` between query and memory embeddings.
    pub similarity: f32,
    /// Linear recency factor: 1.0 when new, 0.0 at 30 days, negative after.
    pub time_relevance: f32,
    /// Weighted blend of similarity and time relevance used for ranking.
    pub combined_score: f32,
}

/// Distance metric behind `similarity = 1 - distance`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// Cosine distance; similarity equals cosine similarity.
    #[default]
    Cosine,
    /// Euclidean (L2) distance.
    Euclidean,
}

/// Knobs for a single retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetrieveOptions {
    /// Maximum number of results.
    pub top_k: usize,
    /// Candidates with similarity at or below this are discarded.
    pub min_similarity: f32,
}

impl Default for RetrieveOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_similarity: DEFAULT_MIN_SIMILARITY,
        }
    }
}

/// Body of a store request from the HTTP or tool layer.
///
/// Missing fields deserialize as empty strings so that validation, not
/// deserialization, reports them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default, rename = "type")]
    pub memory_type: String,
    #[serde(default)]
    pub content: String,
}

/// Body of a retrieve request from the HTTP or tool layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub min_similarity: Option<f32>,
}

/// Outcome of a store call as reported to the HTTP/tool layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MemoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl StoreResponse {
    /// A successful store of memory `id`.
    pub fn stored(id: MemoryId) -> Self {
        Self {
            success: true,
            message: "Memory stored successfully".to_string(),
            id: Some(id),
            error: None,
            details: None,
        }
    }

    /// A failed store, carrying the error kind and details.
    pub fn failed(err: &PersonaError) -> Self {
        Self {
            success: false,
            message: "Failed to store memory".to_string(),
            id: None,
            error: Some(err.kind().to_string()),
            details: Some(err.details().to_string()),
        }
    }
}

/// Outcome of a retrieve call as reported to the HTTP/tool layer.
///
/// Failures never surface as errors here: `memories` is empty and
/// `error`/`details` describe what went wrong.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RetrieveResponse {
    pub memories: Vec<ScoredMemory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl RetrieveResponse {
    pub fn found(memories: Vec<ScoredMemory>) -> Self {
        Self {
            memories,
            error: None,
            details: None,
        }
    }

    pub fn failed(err: &PersonaError) -> Self {
        Self {
            memories: Vec::new(),
            error: Some(err.kind().to_string()),
            details: Some(err.details().to_string()),
        }
    }
}

/// Durable, append-only storage of memory records.
///
/// Implementations must scope `list_by_user` strictly to the given user and
/// return records in insertion order.
pub trait RecordStore: Send + Sync {
    /// Insert one record and return it with its assigned ID.
    fn insert(&self, record: NewMemoryRecord) -> PersonaResult<MemoryRecord>;

    /// All records owned by `user_id`, oldest first.
    fn list_by_user(&self, user_id: &str) -> PersonaResult<Vec<MemoryRecord>>;

    /// Number of records owned by `user_id`.
    fn count_by_user(&self, user_id: &str) -> PersonaResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_type_parse() {
        assert_eq!(
            "learning_goal".parse::<MemoryType>().unwrap(),
            MemoryType::LearningGoal
        );
        assert_eq!(" interest ".parse::<MemoryType>().unwrap(), MemoryType::Interest);
        let err = "hobby".parse::<MemoryType>().unwrap_err();
        assert_eq!(err.kind(), "validation_failure");
    }

    #[test]
    fn test_memory_type_as_str_matches_serde() {
        for t in MemoryType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
            assert_eq!(t.as_str().parse::<MemoryType>().unwrap(), t);
        }
    }

    #[test]
    fn test_scored_memory_serialization_omits_embedding() {
        let scored = ScoredMemory {
            record: MemoryRecord {
                id: MemoryId(7),
                user_id: "u1".to_string(),
                memory_type: MemoryType::Interest,
                content: "likes jazz music".to_string(),
                embedding: vec![0.1, 0.2],
                created_at: Utc::now(),
            },
            similarity: 0.9,
            time_relevance: 1.0,
            combined_score: 0.92,
        };
        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["type"], "interest");
        assert_eq!(json["user_id"], "u1");
        assert!(json.get("embedding").is_none());
        assert!(json.get("combined_score").is_some());
    }

    #[test]
    fn test_store_response_failed() {
        let resp = StoreResponse::failed(&PersonaError::Embedding("timeout".into()));
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("embedding_failure"));
        assert_eq!(resp.details.as_deref(), Some("timeout"));
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_requests_accept_camel_case_and_missing_fields() {
        let req: StoreRequest = serde_json::from_value(serde_json::json!({
            "userId": "u1",
            "type": "interest",
            "content": "likes jazz music"
        }))
        .unwrap();
        assert_eq!(req.user_id, "u1");
        assert_eq!(req.memory_type, "interest");

        let req: RetrieveRequest =
            serde_json::from_value(serde_json::json!({ "query": "music", "topK": 3 })).unwrap();
        assert!(req.user_id.is_empty());
        assert_eq!(req.top_k, Some(3));
        assert!(req.min_similarity.is_none());
    }

    #[test]
    fn test_retrieve_options_default() {
        let opts = RetrieveOptions::default();
        assert_eq!(opts.top_k, 5);
        assert!((opts.min_similarity - 0.5).abs() < f32::EPSILON);
    }
}
