//! Memory CRUD and injection HTTP handlers.
//!
//! Endpoints:
//! - GET    /api/v1/users/{user_id}/memories          - List active memories
//! - GET    /api/v1/users/{user_id}/memories/context  - Injection projection
//! - PUT    /api/v1/users/{user_id}/memories/settings - Set enablement flag
//! - PATCH  /api/v1/users/{user_id}/memories/{id}     - Edit content
//! - DELETE /api/v1/users/{user_id}/memories/{id}     - Delete

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use engram_types::memory::{Memory, MemoryProjection};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

/// Query parameters for the context injection endpoint.
#[derive(Debug, Deserialize)]
pub struct ContextQuery {
    pub project_id: Uuid,
    #[serde(default)]
    pub exclude_chat_id: Option<Uuid>,
}

/// Body for the settings endpoint.
#[derive(Debug, Deserialize)]
pub struct SettingsBody {
    pub project_id: Uuid,
    pub memory_enabled: bool,
}

/// Body for the edit endpoint.
#[derive(Debug, Deserialize)]
pub struct EditBody {
    pub project_id: Uuid,
    pub content: String,
}

/// Query parameters for the delete endpoint.
#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub project_id: Uuid,
}

/// GET /api/v1/users/{user_id}/memories - List a user's active memories.
pub async fn list_memories(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Memory>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let user_id = parse_uuid(&user_id)?;
    let memories = state.memory_service.list_memories(user_id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(memories, request_id, elapsed)))
}

/// GET /api/v1/users/{user_id}/memories/context - Injection projection.
///
/// Always succeeds: internal failures and a disabled flag both yield an
/// empty list, so the chat pipeline can call this unconditionally.
pub async fn get_context_memories(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ContextQuery>,
) -> Result<Json<ApiResponse<Vec<MemoryProjection>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let user_id = parse_uuid(&user_id)?;
    let projections = state
        .memory_service
        .memories_for_context(user_id, query.project_id, query.exclude_chat_id)
        .await;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(projections, request_id, elapsed)))
}

/// PUT /api/v1/users/{user_id}/memories/settings - Set the enablement flag.
pub async fn set_memory_settings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<SettingsBody>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let user_id = parse_uuid(&user_id)?;
    state
        .memory_service
        .set_enabled(user_id, body.project_id, body.memory_enabled)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "memory_enabled": body.memory_enabled }),
        request_id,
        elapsed,
    )))
}

/// PATCH /api/v1/users/{user_id}/memories/{id} - Edit memory content.
pub async fn edit_memory(
    State(state): State<AppState>,
    Path((user_id, memory_id)): Path<(String, String)>,
    Json(body): Json<EditBody>,
) -> Result<Json<ApiResponse<Memory>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let user_id = parse_uuid(&user_id)?;
    let memory_id = parse_uuid(&memory_id)?;
    let updated = state
        .memory_service
        .edit_memory(user_id, body.project_id, memory_id, &body.content)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(updated, request_id, elapsed)))
}

/// DELETE /api/v1/users/{user_id}/memories/{id} - Delete a memory.
pub async fn delete_memory(
    State(state): State<AppState>,
    Path((user_id, memory_id)): Path<(String, String)>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<ApiResponse<Memory>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let user_id = parse_uuid(&user_id)?;
    let memory_id = parse_uuid(&memory_id)?;
    let deleted = state
        .memory_service
        .delete_memory(user_id, query.project_id, memory_id)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(deleted, request_id, elapsed)))
}
