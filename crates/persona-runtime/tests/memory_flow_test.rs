//! End-to-end tests for the store → retrieve flow.
//!
//! These wire a deterministic embedding driver into a real on-disk SQLite
//! store and exercise the service the way the HTTP and tool layers do.

use async_trait::async_trait;
use persona_memory::SqliteRecordStore;
use persona_runtime::embedding::{EmbeddingDriver, EmbeddingError};
use persona_runtime::MemoryService;
use persona_types::config::MemoryConfig;
use persona_types::memory::{RecordStore, SimilarityMetric};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Mock embedding driver: bag of keywords over three topic axes plus a bias
// ---------------------------------------------------------------------------

struct TopicEmbedding;

const TOPICS: [&[&str]; 3] = [
    &["music", "jazz", "song", "songs", "piano"],
    &["like", "likes", "enjoy", "love"],
    &["rust", "borrow", "checker", "lifetimes"],
];

fn topic_vector(text: &str) -> Vec<f32> {
    let mut v = vec![0.0, 0.0, 0.0, 1.0];
    for word in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        for (axis, words) in TOPICS.iter().enumerate() {
            if words.contains(&word) {
                v[axis] += 1.0;
            }
        }
    }
    v
}

#[async_trait]
impl EmbeddingDriver for TopicEmbedding {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| topic_vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        4
    }
}

fn open_service(path: &std::path::Path) -> (Arc<SqliteRecordStore>, MemoryService) {
    let store = Arc::new(SqliteRecordStore::open(path).unwrap());
    let svc = MemoryService::new(store.clone(), Arc::new(TopicEmbedding), &MemoryConfig::default());
    (store, svc)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_music_preference_is_recalled() {
    let dir = tempfile::tempdir().unwrap();
    let (_store, svc) = open_service(&dir.path().join("memory.db"));

    assert!(svc.store("user-1", "interest", "likes jazz music").await.success);
    assert!(
        svc.store("user-1", "learning_goal", "understand the borrow checker")
            .await
            .success
    );

    let resp = svc
        .retrieve("user-1", "what music do I like?", None, None)
        .await;
    assert!(resp.error.is_none());
    assert_eq!(resp.memories.len(), 1);
    assert_eq!(resp.memories[0].record.content, "likes jazz music");
    assert!(resp.memories[0].similarity > 0.5);
}

#[tokio::test]
async fn test_identical_text_scores_exactly_one() {
    let dir = tempfile::tempdir().unwrap();
    let (_store, svc) = open_service(&dir.path().join("memory.db"));

    svc.store("user-1", "key_point", "prefers piano songs").await;
    let resp = svc
        .retrieve("user-1", "prefers piano songs", None, None)
        .await;
    assert_eq!(resp.memories.len(), 1);
    assert_eq!(resp.memories[0].similarity, 1.0);
    let expected = 0.8 + 0.2 * resp.memories[0].time_relevance;
    assert!((resp.memories[0].combined_score - expected).abs() < 1e-6);
}

#[tokio::test]
async fn test_users_never_see_each_other() {
    let dir = tempfile::tempdir().unwrap();
    let (_store, svc) = open_service(&dir.path().join("memory.db"));

    svc.store("alice", "interest", "likes jazz music").await;
    let resp = svc.retrieve("bob", "likes jazz music", None, None).await;
    assert!(resp.memories.is_empty());
    assert!(resp.error.is_none());
}

#[tokio::test]
async fn test_duplicate_content_kept_as_separate_records() {
    let dir = tempfile::tempdir().unwrap();
    let (store, svc) = open_service(&dir.path().join("memory.db"));

    let first = svc.store("user-1", "interest", "likes jazz").await;
    let second = svc.store("user-1", "interest", "likes jazz").await;
    assert_ne!(first.id, second.id);
    assert_eq!(store.count_by_user("user-1").unwrap(), 2);

    let resp = svc.retrieve("user-1", "likes jazz", None, None).await;
    assert_eq!(resp.memories.len(), 2);
    let mut ids: Vec<_> = resp.memories.iter().map(|m| Some(m.record.id)).collect();
    ids.sort();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[tokio::test]
async fn test_memories_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memory.db");
    {
        let (_store, svc) = open_service(&path);
        svc.store("user-1", "interest", "likes jazz music").await;
    }
    let (_store, svc) = open_service(&path);
    let resp = svc.retrieve("user-1", "jazz music", None, None).await;
    assert_eq!(resp.memories.len(), 1);
    assert_eq!(resp.memories[0].record.content, "likes jazz music");
}

#[tokio::test]
async fn test_euclidean_metric_ranks_nearest_first() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteRecordStore::open(&dir.path().join("memory.db")).unwrap());
    let config = MemoryConfig {
        similarity_metric: SimilarityMetric::Euclidean,
        ..MemoryConfig::default()
    };
    let svc = MemoryService::new(store, Arc::new(TopicEmbedding), &config);

    svc.store("user-1", "interest", "jazz").await;
    svc.store("user-1", "interest", "rust lifetimes").await;

    let resp = svc.retrieve("user-1", "jazz", None, Some(-10.0)).await;
    assert_eq!(resp.memories.len(), 2);
    assert_eq!(resp.memories[0].record.content, "jazz");
    assert_eq!(resp.memories[0].similarity, 1.0);
    assert!(resp.memories[1].similarity < 0.0);
}
