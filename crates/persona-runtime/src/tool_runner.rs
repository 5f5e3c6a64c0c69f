//! Executes the memory tools on behalf of an LLM harness.

use crate::service::MemoryService;
use persona_types::error::PersonaError;
use persona_types::memory::{RetrieveRequest, StoreRequest};
use persona_types::tool::{ToolCall, ToolResult, RETRIEVE_MEMORIES_TOOL, STORE_MEMORY_TOOL};
use serde::Serialize;
use tracing::debug;

/// Run one memory tool call.
///
/// `content` holds the JSON-encoded store or retrieve response. A failed store
/// or an unknown tool sets `is_error`; a degraded retrieval does not, since
/// an empty memory list is still a usable answer.
pub async fn execute_memory_tool(service: &MemoryService, call: &ToolCall) -> ToolResult {
    debug!(tool = %call.name, id = %call.id, "Executing memory tool");
    match call.name.as_str() {
        STORE_MEMORY_TOOL => match serde_json::from_value::<StoreRequest>(call.input.clone()) {
            Ok(req) => {
                let resp = service.handle_store(&req).await;
                let is_error = !resp.success;
                result(call, &resp, is_error)
            }
            Err(e) => failed_result(
                call,
                &PersonaError::Validation(format!("Invalid input for {STORE_MEMORY_TOOL}: {e}")),
            ),
        },
        RETRIEVE_MEMORIES_TOOL => {
            match serde_json::from_value::<RetrieveRequest>(call.input.clone()) {
                Ok(req) => {
                    let resp = service.handle_retrieve(&req).await;
                    result(call, &resp, false)
                }
                Err(e) => failed_result(
                    call,
                    &PersonaError::Validation(format!(
                        "Invalid input for {RETRIEVE_MEMORIES_TOOL}: {e}"
                    )),
                ),
            }
        }
        other => failed_result(
            call,
            &PersonaError::Validation(format!("Unknown tool: {other}")),
        ),
    }
}

fn result<T: Serialize>(call: &ToolCall, body: &T, is_error: bool) -> ToolResult {
    match serde_json::to_string(body) {
        Ok(content) => ToolResult {
            tool_use_id: call.id.clone(),
            content,
            is_error,
        },
        Err(e) => failed_result(
            call,
            &PersonaError::Serialization(format!("Failed to encode tool result: {e}")),
        ),
    }
}

/// An `is_error` result whose content is `{"error": kind, "details": ...}`.
pub fn failed_result(call: &ToolCall, err: &PersonaError) -> ToolResult {
    ToolResult {
        tool_use_id: call.id.clone(),
        content: serde_json::json!({ "error": err.kind(), "details": err.details() }).to_string(),
        is_error: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{EmbeddingDriver, EmbeddingError};
    use async_trait::async_trait;
    use persona_memory::SqliteRecordStore;
    use persona_types::config::MemoryConfig;
    use std::sync::Arc;

    struct UnitEmbedding;

    #[async_trait]
    impl EmbeddingDriver for UnitEmbedding {
        async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts.iter().map(|_| vec![0.6, 0.8]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn service() -> MemoryService {
        let store = Arc::new(SqliteRecordStore::open_in_memory().unwrap());
        MemoryService::new(store, Arc::new(UnitEmbedding), &MemoryConfig::default())
    }

    fn call(name: &str, input: serde_json::Value) -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            name: name.to_string(),
            input,
        }
    }

    #[tokio::test]
    async fn test_store_then_retrieve_tools() {
        let svc = service();
        let stored = execute_memory_tool(
            &svc,
            &call(
                STORE_MEMORY_TOOL,
                serde_json::json!({ "userId": "u1", "type": "interest", "content": "likes jazz" }),
            ),
        )
        .await;
        assert!(!stored.is_error);
        assert_eq!(stored.tool_use_id, "call_1");
        let body: serde_json::Value = serde_json::from_str(&stored.content).unwrap();
        assert_eq!(body["success"], true);

        let found = execute_memory_tool(
            &svc,
            &call(
                RETRIEVE_MEMORIES_TOOL,
                serde_json::json!({ "userId": "u1", "query": "music", "topK": 1 }),
            ),
        )
        .await;
        assert!(!found.is_error);
        let body: serde_json::Value = serde_json::from_str(&found.content).unwrap();
        assert_eq!(body["memories"].as_array().unwrap().len(), 1);
        assert_eq!(body["memories"][0]["content"], "likes jazz");
    }

    #[tokio::test]
    async fn test_failed_store_is_error() {
        let result = execute_memory_tool(
            &service(),
            &call(
                STORE_MEMORY_TOOL,
                serde_json::json!({ "userId": "u1", "type": "interest" }),
            ),
        )
        .await;
        assert!(result.is_error);
        let body: serde_json::Value = serde_json::from_str(&result.content).unwrap();
        assert_eq!(body["error"], "validation_failure");
    }

    #[tokio::test]
    async fn test_malformed_input_is_error() {
        let result = execute_memory_tool(
            &service(),
            &call(RETRIEVE_MEMORIES_TOOL, serde_json::json!({ "topK": "many" })),
        )
        .await;
        assert!(result.is_error);
        assert!(result.content.contains("Invalid input"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let result =
            execute_memory_tool(&service(), &call("forget_everything", serde_json::json!({}))).await;
        assert!(result.is_error);
        assert!(result.content.contains("Unknown tool"));
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("map key must be a string"))
        }
    }

    #[test]
    fn test_encode_failure_is_serialization_error() {
        let call = call(STORE_MEMORY_TOOL, serde_json::json!({}));
        let res = result(&call, &Unencodable, false);
        assert!(res.is_error);
        assert_eq!(res.tool_use_id, "call_1");
        let body: serde_json::Value = serde_json::from_str(&res.content).unwrap();
        assert_eq!(body["error"], "serialization_error");
        assert!(body["details"]
            .as_str()
            .unwrap()
            .contains("map key must be a string"));
    }
}
