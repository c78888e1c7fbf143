//! Extraction scheduling HTTP handler.
//!
//! POST /api/v1/extractions - called by the chat pipeline after a turn
//! completes. Schedules a background extraction and responds 202
//! immediately; the caller never waits on (or learns about) the outcome.

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info_span;
use uuid::Uuid;

use engram_observe::genai_attrs;
use engram_types::llm::{Message, MessageRole, ProviderKind};
use engram_types::memory::MemoryExtractionOptions;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// One chat message in the extraction request.
#[derive(Debug, Deserialize)]
pub struct ExtractionMessage {
    pub role: MessageRole,
    pub content: String,
}

/// Body for the extraction scheduling endpoint.
#[derive(Debug, Deserialize)]
pub struct ExtractionBody {
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub chat_id: Uuid,
    pub provider: ProviderKind,
    /// Messages exchanged since the last extraction.
    pub messages: Vec<ExtractionMessage>,
}

/// POST /api/v1/extractions - Schedule a background memory extraction.
pub async fn schedule_extraction(
    State(state): State<AppState>,
    Json(body): Json<ExtractionBody>,
) -> Result<(StatusCode, Json<ApiResponse<serde_json::Value>>), AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    if body.messages.is_empty() {
        return Err(AppError::Validation(
            "messages must not be empty".to_string(),
        ));
    }

    let model_id = body.provider.extractor_model_id();
    let span = info_span!(
        "schedule_extraction",
        { genai_attrs::GEN_AI_OPERATION_NAME } = genai_attrs::OP_EXTRACT_MEMORY,
        { genai_attrs::GEN_AI_PROVIDER_NAME } = %body.provider,
        { genai_attrs::GEN_AI_REQUEST_MODEL } = model_id,
    );
    let _guard = span.enter();

    let opts = MemoryExtractionOptions {
        user_id: body.user_id,
        project_id: body.project_id,
        chat_id: body.chat_id,
        provider: body.provider,
        messages: body
            .messages
            .into_iter()
            .map(|m| Message {
                role: m.role,
                content: m.content,
            })
            .collect(),
    };

    state.memory_service.schedule_extraction(opts);

    let elapsed = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::success(
            serde_json::json!({ "scheduled": true }),
            request_id,
            elapsed,
        )),
    ))
}
