//! Route handlers for the Persona API.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use persona_kernel::PersonaKernel;
use persona_runtime::tool_runner::{execute_memory_tool, failed_result};
use persona_types::error::PersonaError;
use persona_types::memory::{RetrieveRequest, RetrieveResponse, StoreRequest, StoreResponse};
use persona_types::tool::{memory_tool_definitions, ToolCall};
use std::sync::Arc;
use tracing::{debug, warn};

/// Shared state handed to every handler.
pub struct AppState {
    pub kernel: Arc<PersonaKernel>,
}

/// POST /api/memories/retrieve: the memories most relevant to a query.
///
/// Always answers 200: a failed retrieval, including an unreadable body, is
/// an empty `memories` list plus `error`/`details`.
pub async fn retrieve_memories(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RetrieveRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let err = rejected_body(&rejection);
            return Json(RetrieveResponse::failed(&err));
        }
    };
    debug!(
        user_id = %req.user_id,
        query_len = req.query.len(),
        "Retrieve request"
    );
    let resp = state.kernel.memory.handle_retrieve(&req).await;
    Json(resp)
}

/// POST /api/memories: store a new memory.
pub async fn store_memory(
    State(state): State<Arc<AppState>>,
    body: Result<Json<StoreRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let resp = StoreResponse::failed(&rejected_body(&rejection));
            return (StatusCode::BAD_REQUEST, Json(resp));
        }
    };
    let resp = state.kernel.memory.handle_store(&req).await;
    (store_status(&resp), Json(resp))
}

/// A body axum could not read as JSON becomes a validation failure.
fn rejected_body(rejection: &JsonRejection) -> PersonaError {
    warn!(status = %rejection.status(), "Rejected request body: {}", rejection.body_text());
    PersonaError::Validation(format!("invalid request body: {}", rejection.body_text()))
}

fn store_status(resp: &StoreResponse) -> StatusCode {
    if resp.success {
        return StatusCode::CREATED;
    }
    match resp.error.as_deref() {
        Some("validation_failure") => StatusCode::BAD_REQUEST,
        Some("embedding_failure") => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// GET /api/users/{user_id}/memories: every memory stored for a user.
pub async fn list_user_memories(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    match state.kernel.memory.list(&user_id).await {
        Ok(records) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "user_id": user_id,
                "count": records.len(),
                "memories": records,
            })),
        ),
        Err(e) => {
            let status = if e.kind() == "validation_failure" {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (
                status,
                Json(serde_json::json!({
                    "error": e.kind(),
                    "details": e.details(),
                })),
            )
        }
    }
}

/// GET /api/tools: definitions of the memory tools.
pub async fn list_tools() -> impl IntoResponse {
    let tools = memory_tool_definitions();
    Json(serde_json::json!({ "tools": tools, "total": tools.len() }))
}

/// POST /api/tools/{name}: run a memory tool with the request body as input.
pub async fn run_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> impl IntoResponse {
    let mut call = ToolCall {
        id: format!("http-{name}"),
        name,
        input: serde_json::Value::Null,
    };
    match body {
        Ok(Json(input)) => call.input = input,
        Err(rejection) => return Json(failed_result(&call, &rejected_body(&rejection))),
    }
    let result = execute_memory_tool(&state.kernel.memory, &call).await;
    Json(result)
}

/// GET /api/health: liveness plus a few effective settings.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = &state.kernel.config;
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "embedding_provider": config.embedding.provider,
        "embedding_model": config.embedding.model,
        "embedding_dimensions": config.embedding.dimensions,
    }))
}
