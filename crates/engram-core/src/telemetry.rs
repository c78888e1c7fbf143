//! Telemetry port definitions.
//!
//! `AnalyticsSink` delivers product analytics events; `InferenceLedger`
//! records billable model invocations. Both are best-effort side channels:
//! the memory subsystem never blocks or fails on their behalf.

use engram_types::error::RepositoryError;
use engram_types::telemetry::{AnalyticsEvent, LlmInferenceRecord};
use uuid::Uuid;

/// Fire-and-forget product analytics sink.
///
/// Implementations must swallow and log their own delivery failures;
/// `capture` is infallible from the caller's point of view.
pub trait AnalyticsSink: Send + Sync {
    /// Record one event for a user with arbitrary JSON properties.
    fn capture(
        &self,
        user_id: Uuid,
        event: AnalyticsEvent,
        properties: serde_json::Value,
    ) -> impl std::future::Future<Output = ()> + Send;
}

/// Ledger of model invocations, one entry per billable call.
///
/// Implementations live in engram-infra (e.g., `SqliteInferenceLedger`).
pub trait InferenceLedger: Send + Sync {
    /// Append one inference record.
    fn insert_llm_inference(
        &self,
        record: &LlmInferenceRecord,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
