//! Telemetry types for Engram.
//!
//! Analytics event names for the product analytics sink and the inference
//! ledger record appended after every billable model invocation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

use crate::llm::{ProviderKind, TokenUsage};

/// Product analytics events emitted by the memory subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsEvent {
    MemoryExtractionCompleted,
    MemoryEnabledUpdated,
    MemoryUpdated,
    MemoryDeleted,
}

impl AnalyticsEvent {
    /// Wire-format event name.
    pub fn name(&self) -> &'static str {
        match self {
            AnalyticsEvent::MemoryExtractionCompleted => "agent_memory_extraction_completed",
            AnalyticsEvent::MemoryEnabledUpdated => "agent_memory_enabled_updated",
            AnalyticsEvent::MemoryUpdated => "agent_memory_updated",
            AnalyticsEvent::MemoryDeleted => "agent_memory_deleted",
        }
    }
}

impl fmt::Display for AnalyticsEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Kind of model invocation recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceType {
    MemoryExtraction,
}

impl fmt::Display for InferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferenceType::MemoryExtraction => write!(f, "memory_extraction"),
        }
    }
}

/// One entry in the inference-usage ledger.
///
/// Token counts are carried verbatim from the provider response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmInferenceRecord {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub chat_id: Uuid,
    pub inference_type: InferenceType,
    pub provider: ProviderKind,
    pub model_id: String,
    pub usage: TokenUsage,
    pub created_at: DateTime<Utc>,
}
