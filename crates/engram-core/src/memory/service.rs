//! Memory service orchestration.
//!
//! `MemoryService` owns the two halves of the memory subsystem:
//!
//! - the read path: fetch a user's memories for system-prompt injection,
//!   degrading to an empty list on any internal failure so chat always
//!   proceeds;
//! - the write path: background extraction scheduled after a chat turn,
//!   which gates on the enablement flag, resolves the extractor model,
//!   invokes the LLM, reconciles output against existing memories,
//!   persists, and records telemetry plus an inference-ledger entry.
//!
//! The user-facing mutations (set-enabled, edit, delete) are the only
//! operations that propagate errors to the caller.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use engram_types::error::{MemoryError, RepositoryError};
use engram_types::llm::TokenUsage;
use engram_types::memory::{Memory, MemoryExtractionOptions, MemoryProjection};
use engram_types::telemetry::{AnalyticsEvent, InferenceType, LlmInferenceRecord};

use crate::llm::resolver::ModelResolver;
use crate::task::TaskPool;
use crate::telemetry::{AnalyticsSink, InferenceLedger};

use super::extractor::MemoryExtractor;
use super::normalize::normalize_memory_content;
use super::reconciler::{reconcile, ReconciledBatch};
use super::store::MemoryRepository;

/// Maximum memory content length (characters, after trim) on the edit path.
const MAX_CONTENT_CHARS: usize = 1000;

/// Orchestrates memory injection, background extraction, and the
/// user-facing mutation surface.
///
/// Generic over the persistence, model-resolution, and telemetry ports so
/// engram-core never depends on engram-infra. Constructed once at process
/// start and passed by reference to handlers; cloning is cheap (all fields
/// are `Arc` or handles).
pub struct MemoryService<M, R, A, L> {
    store: Arc<M>,
    resolver: Arc<R>,
    analytics: Arc<A>,
    ledger: Arc<L>,
    tasks: TaskPool,
}

impl<M, R, A, L> Clone for MemoryService<M, R, A, L> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            resolver: Arc::clone(&self.resolver),
            analytics: Arc::clone(&self.analytics),
            ledger: Arc::clone(&self.ledger),
            tasks: self.tasks.clone(),
        }
    }
}

impl<M, R, A, L> MemoryService<M, R, A, L>
where
    M: MemoryRepository + 'static,
    R: ModelResolver + 'static,
    A: AnalyticsSink + 'static,
    L: InferenceLedger + 'static,
{
    /// Create a new memory service over the given ports.
    pub fn new(
        store: Arc<M>,
        resolver: Arc<R>,
        analytics: Arc<A>,
        ledger: Arc<L>,
        tasks: TaskPool,
    ) -> Self {
        Self {
            store,
            resolver,
            analytics,
            ledger,
            tasks,
        }
    }

    // --- Read path (context injection) ---

    /// Get a user's active memories for system-prompt injection.
    ///
    /// Never fails from the caller's point of view: a disabled flag returns
    /// an empty list without touching the store, and any internal failure
    /// is logged and degrades to an empty list -- chat proceeds without
    /// personalization context.
    pub async fn memories_for_context(
        &self,
        user_id: Uuid,
        project_id: Uuid,
        exclude_chat_id: Option<Uuid>,
    ) -> Vec<MemoryProjection> {
        match self
            .try_memories_for_context(user_id, project_id, exclude_chat_id)
            .await
        {
            Ok(projections) => projections,
            Err(e) => {
                tracing::error!(
                    user_id = %user_id,
                    error = %e,
                    "Memory injection failed; continuing without context"
                );
                Vec::new()
            }
        }
    }

    async fn try_memories_for_context(
        &self,
        user_id: Uuid,
        project_id: Uuid,
        exclude_chat_id: Option<Uuid>,
    ) -> Result<Vec<MemoryProjection>, RepositoryError> {
        if !self.store.get_memory_enabled(&user_id, &project_id).await? {
            return Ok(Vec::new());
        }
        let memories = self
            .store
            .get_user_memories(&user_id, exclude_chat_id.as_ref())
            .await?;
        Ok(memories.iter().map(MemoryProjection::from).collect())
    }

    // --- Write path (background extraction) ---

    /// Schedule a background extraction for one chat turn.
    ///
    /// Returns immediately; the extraction runs on the task pool and its
    /// failures are logged there, never surfaced to the triggering request.
    pub fn schedule_extraction(&self, opts: MemoryExtractionOptions) {
        let service = self.clone();
        let task_name = format!("memory-extraction:{}", opts.chat_id);
        self.tasks
            .submit(task_name, async move { service.run_extraction(opts).await });
    }

    #[tracing::instrument(
        name = "memory_extraction",
        skip(self, opts),
        fields(
            user_id = %opts.user_id,
            chat_id = %opts.chat_id,
            provider = %opts.provider,
        )
    )]
    async fn run_extraction(&self, opts: MemoryExtractionOptions) -> anyhow::Result<()> {
        if !self
            .store
            .get_memory_enabled(&opts.user_id, &opts.project_id)
            .await?
        {
            tracing::debug!("Memory disabled for user/project; skipping extraction");
            return Ok(());
        }

        let model_id = opts.provider.extractor_model_id();
        let Some(model) = self
            .resolver
            .resolve(opts.project_id, opts.provider, model_id)
            .await
        else {
            tracing::debug!(model_id, "No extractor model resolved; skipping extraction");
            return Ok(());
        };

        let existing = self.store.get_user_memories(&opts.user_id, None).await?;

        let Some(extraction) =
            MemoryExtractor::extract(&model, model_id, &existing, &opts.messages).await?
        else {
            tracing::debug!("Nothing worth extracting");
            return Ok(());
        };

        let batch = reconcile(opts.user_id, opts.chat_id, &existing, &extraction.output);
        if !batch.records.is_empty() {
            self.store.upsert_and_supersede(&batch.records).await?;
        }

        tracing::info!(
            new_count = batch.new_count,
            superseded_count = batch.superseded_count,
            "Memory extraction completed"
        );

        self.track_extraction(&opts, model_id, extraction.usage, &batch)
            .await;
        self.record_inference(&opts, model_id, extraction.usage)
            .await?;

        Ok(())
    }

    async fn track_extraction(
        &self,
        opts: &MemoryExtractionOptions,
        model_id: &str,
        usage: TokenUsage,
        batch: &ReconciledBatch,
    ) {
        self.analytics
            .capture(
                opts.user_id,
                AnalyticsEvent::MemoryExtractionCompleted,
                json!({
                    "project_id": opts.project_id,
                    "chat_id": opts.chat_id,
                    "model_id": model_id,
                    "provider": opts.provider.to_string(),
                    "input_tokens": usage.input_tokens,
                    "output_tokens": usage.output_tokens,
                    "new_memories_count": batch.new_count,
                    "superseded_memories_count": batch.superseded_count,
                }),
            )
            .await;
    }

    async fn record_inference(
        &self,
        opts: &MemoryExtractionOptions,
        model_id: &str,
        usage: TokenUsage,
    ) -> Result<(), RepositoryError> {
        self.ledger
            .insert_llm_inference(&LlmInferenceRecord {
                id: Uuid::now_v7(),
                project_id: opts.project_id,
                user_id: opts.user_id,
                chat_id: opts.chat_id,
                inference_type: InferenceType::MemoryExtraction,
                provider: opts.provider,
                model_id: model_id.to_string(),
                usage,
                created_at: Utc::now(),
            })
            .await
    }

    // --- User-facing mutation surface ---

    /// Normalize memory content; shared with the edit path so user edits
    /// follow the same cleanup rule as extracted content.
    pub fn normalize_content(&self, content: &str) -> String {
        normalize_memory_content(content)
    }

    /// List a user's active memories (settings surface).
    pub async fn list_memories(&self, user_id: Uuid) -> Result<Vec<Memory>, MemoryError> {
        Ok(self.store.get_user_memories(&user_id, None).await?)
    }

    /// Enable or disable memory for a (user, project) pair.
    pub async fn set_enabled(
        &self,
        user_id: Uuid,
        project_id: Uuid,
        enabled: bool,
    ) -> Result<(), MemoryError> {
        self.store
            .set_memory_enabled(&user_id, &project_id, enabled)
            .await?;
        self.analytics
            .capture(
                user_id,
                AnalyticsEvent::MemoryEnabledUpdated,
                json!({
                    "project_id": project_id,
                    "memory_enabled": enabled,
                }),
            )
            .await;
        Ok(())
    }

    /// Replace a memory's content after normalization.
    ///
    /// Content must be 1-1000 characters after trimming; empty-after-
    /// normalize and unknown ids are request-level errors.
    pub async fn edit_memory(
        &self,
        user_id: Uuid,
        project_id: Uuid,
        memory_id: Uuid,
        content: &str,
    ) -> Result<Memory, MemoryError> {
        if content.trim().chars().count() > MAX_CONTENT_CHARS {
            return Err(MemoryError::ContentTooLong {
                max: MAX_CONTENT_CHARS,
            });
        }
        let normalized = normalize_memory_content(content);
        if normalized.is_empty() {
            return Err(MemoryError::EmptyContent);
        }

        let updated = self
            .store
            .update_memory_content(&user_id, &memory_id, &normalized)
            .await?
            .ok_or(MemoryError::NotFound)?;

        self.analytics
            .capture(
                user_id,
                AnalyticsEvent::MemoryUpdated,
                json!({
                    "project_id": project_id,
                    "memory_id": memory_id,
                    "memory_category": updated.category.to_string(),
                }),
            )
            .await;

        Ok(updated)
    }

    /// Delete a memory. Unknown ids are a request-level error.
    pub async fn delete_memory(
        &self,
        user_id: Uuid,
        project_id: Uuid,
        memory_id: Uuid,
    ) -> Result<Memory, MemoryError> {
        let deleted = self
            .store
            .delete_memory(&user_id, &memory_id)
            .await?
            .ok_or(MemoryError::NotFound)?;

        self.analytics
            .capture(
                user_id,
                AnalyticsEvent::MemoryDeleted,
                json!({
                    "project_id": project_id,
                    "memory_id": memory_id,
                    "memory_category": deleted.category.to_string(),
                }),
            )
            .await;

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use engram_types::llm::{
        CompletionRequest, CompletionResponse, LlmError, Message, MessageRole, ProviderKind,
        StopReason,
    };
    use engram_types::memory::{MemoryCategory, NewMemory};

    use crate::llm::box_provider::BoxLlmProvider;
    use crate::llm::provider::LlmProvider;

    // --- In-memory fakes for the ports ---

    #[derive(Default)]
    struct FakeRepo {
        memories: Mutex<Vec<Memory>>,
        disabled: AtomicBool,
        fail_flag_reads: AtomicBool,
        fail_memory_reads: AtomicBool,
        memory_read_calls: AtomicUsize,
    }

    impl FakeRepo {
        fn seed(&self, content: &str) -> Memory {
            let memory = Memory {
                id: Uuid::now_v7(),
                user_id: Uuid::nil(),
                chat_id: Uuid::now_v7(),
                category: MemoryCategory::PersonalFact,
                content: content.to_string(),
                supersedes_id: None,
                superseded_by: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            self.memories.lock().unwrap().push(memory.clone());
            memory
        }

        fn contents(&self) -> Vec<String> {
            self.memories
                .lock()
                .unwrap()
                .iter()
                .map(|m| m.content.clone())
                .collect()
        }
    }

    impl MemoryRepository for FakeRepo {
        async fn get_user_memories(
            &self,
            _user_id: &Uuid,
            exclude_chat_id: Option<&Uuid>,
        ) -> Result<Vec<Memory>, RepositoryError> {
            self.memory_read_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_memory_reads.load(Ordering::SeqCst) {
                return Err(RepositoryError::Query("reader offline".to_string()));
            }
            Ok(self
                .memories
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.superseded_by.is_none())
                .filter(|m| exclude_chat_id.is_none_or(|chat| &m.chat_id != chat))
                .cloned()
                .collect())
        }

        async fn upsert_and_supersede(
            &self,
            records: &[NewMemory],
        ) -> Result<(), RepositoryError> {
            let mut memories = self.memories.lock().unwrap();
            for record in records {
                let id = Uuid::now_v7();
                if let Some(superseded) = record.supersedes_id {
                    if let Some(old) = memories.iter_mut().find(|m| m.id == superseded) {
                        old.superseded_by = Some(id);
                    }
                }
                memories.push(Memory {
                    id,
                    user_id: record.user_id,
                    chat_id: record.chat_id,
                    category: record.category,
                    content: record.content.clone(),
                    supersedes_id: record.supersedes_id,
                    superseded_by: None,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                });
            }
            Ok(())
        }

        async fn get_memory_enabled(
            &self,
            _user_id: &Uuid,
            _project_id: &Uuid,
        ) -> Result<bool, RepositoryError> {
            if self.fail_flag_reads.load(Ordering::SeqCst) {
                return Err(RepositoryError::Connection);
            }
            Ok(!self.disabled.load(Ordering::SeqCst))
        }

        async fn set_memory_enabled(
            &self,
            _user_id: &Uuid,
            _project_id: &Uuid,
            enabled: bool,
        ) -> Result<(), RepositoryError> {
            self.disabled.store(!enabled, Ordering::SeqCst);
            Ok(())
        }

        async fn update_memory_content(
            &self,
            _user_id: &Uuid,
            memory_id: &Uuid,
            content: &str,
        ) -> Result<Option<Memory>, RepositoryError> {
            let mut memories = self.memories.lock().unwrap();
            Ok(memories.iter_mut().find(|m| &m.id == memory_id).map(|m| {
                m.content = content.to_string();
                m.updated_at = Utc::now();
                m.clone()
            }))
        }

        async fn delete_memory(
            &self,
            _user_id: &Uuid,
            memory_id: &Uuid,
        ) -> Result<Option<Memory>, RepositoryError> {
            let mut memories = self.memories.lock().unwrap();
            let index = memories.iter().position(|m| &m.id == memory_id);
            Ok(index.map(|i| memories.remove(i)))
        }
    }

    /// Provider that always replies with a fixed body.
    struct CannedProvider {
        body: String,
        fail: bool,
    }

    impl LlmProvider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            if self.fail {
                return Err(LlmError::Provider {
                    message: "model down".to_string(),
                });
            }
            Ok(CompletionResponse {
                id: "resp".to_string(),
                content: self.body.clone(),
                model: request.model.clone(),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage {
                    input_tokens: 100,
                    output_tokens: 20,
                },
            })
        }
    }

    /// Resolver returning a canned provider, or nothing.
    struct FakeResolver {
        body: Option<String>,
        fail_call: bool,
    }

    impl FakeResolver {
        fn with_body(body: &str) -> Self {
            Self {
                body: Some(body.to_string()),
                fail_call: false,
            }
        }

        fn unresolvable() -> Self {
            Self {
                body: None,
                fail_call: false,
            }
        }

        fn failing_model() -> Self {
            Self {
                body: Some(String::new()),
                fail_call: true,
            }
        }
    }

    impl ModelResolver for FakeResolver {
        async fn resolve(
            &self,
            _project_id: Uuid,
            _provider: ProviderKind,
            _model_id: &str,
        ) -> Option<BoxLlmProvider> {
            self.body.as_ref().map(|body| {
                BoxLlmProvider::new(CannedProvider {
                    body: body.clone(),
                    fail: self.fail_call,
                })
            })
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<(AnalyticsEvent, serde_json::Value)>>,
    }

    impl AnalyticsSink for RecordingSink {
        async fn capture(
            &self,
            _user_id: Uuid,
            event: AnalyticsEvent,
            properties: serde_json::Value,
        ) {
            self.events.lock().unwrap().push((event, properties));
        }
    }

    #[derive(Default)]
    struct RecordingLedger {
        records: Mutex<Vec<LlmInferenceRecord>>,
    }

    impl InferenceLedger for RecordingLedger {
        async fn insert_llm_inference(
            &self,
            record: &LlmInferenceRecord,
        ) -> Result<(), RepositoryError> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    // --- Harness ---

    struct Harness {
        repo: Arc<FakeRepo>,
        sink: Arc<RecordingSink>,
        ledger: Arc<RecordingLedger>,
        service: MemoryService<FakeRepo, FakeResolver, RecordingSink, RecordingLedger>,
    }

    fn harness(resolver: FakeResolver) -> Harness {
        let repo = Arc::new(FakeRepo::default());
        let sink = Arc::new(RecordingSink::default());
        let ledger = Arc::new(RecordingLedger::default());
        let service = MemoryService::new(
            Arc::clone(&repo),
            Arc::new(resolver),
            Arc::clone(&sink),
            Arc::clone(&ledger),
            TaskPool::new(8, 2),
        );
        Harness {
            repo,
            sink,
            ledger,
            service,
        }
    }

    fn extraction_opts() -> MemoryExtractionOptions {
        MemoryExtractionOptions {
            user_id: Uuid::now_v7(),
            project_id: Uuid::now_v7(),
            chat_id: Uuid::now_v7(),
            provider: ProviderKind::Anthropic,
            messages: vec![Message {
                role: MessageRole::User,
                content: "always show me the SQL before running it".to_string(),
            }],
        }
    }

    // --- Read path ---

    #[tokio::test]
    async fn test_injection_disabled_skips_store_read() {
        let h = harness(FakeResolver::unresolvable());
        h.repo.disabled.store(true, Ordering::SeqCst);
        h.repo.seed("should not be returned.");

        let projections = h
            .service
            .memories_for_context(Uuid::now_v7(), Uuid::now_v7(), None)
            .await;

        assert!(projections.is_empty());
        assert_eq!(h.repo.memory_read_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_injection_flag_failure_degrades_to_empty() {
        let h = harness(FakeResolver::unresolvable());
        h.repo.fail_flag_reads.store(true, Ordering::SeqCst);

        let projections = h
            .service
            .memories_for_context(Uuid::now_v7(), Uuid::now_v7(), None)
            .await;
        assert!(projections.is_empty());
    }

    #[tokio::test]
    async fn test_injection_store_failure_degrades_to_empty() {
        let h = harness(FakeResolver::unresolvable());
        h.repo.fail_memory_reads.store(true, Ordering::SeqCst);

        let projections = h
            .service
            .memories_for_context(Uuid::now_v7(), Uuid::now_v7(), None)
            .await;
        assert!(projections.is_empty());
    }

    #[tokio::test]
    async fn test_injection_returns_projections() {
        let h = harness(FakeResolver::unresolvable());
        let memory = h.repo.seed("Prefers metric units.");

        let projections = h
            .service
            .memories_for_context(Uuid::now_v7(), Uuid::now_v7(), None)
            .await;

        assert_eq!(projections.len(), 1);
        assert_eq!(projections[0].category, memory.category);
        assert_eq!(projections[0].content, "Prefers metric units.");
    }

    #[tokio::test]
    async fn test_injection_excludes_originating_chat() {
        let h = harness(FakeResolver::unresolvable());
        let memory = h.repo.seed("From the current chat.");

        let projections = h
            .service
            .memories_for_context(Uuid::now_v7(), Uuid::now_v7(), Some(memory.chat_id))
            .await;
        assert!(projections.is_empty());
    }

    // --- Extraction path ---

    #[tokio::test]
    async fn test_extraction_persists_and_records() {
        let body = r#"{"user_instructions": [{"content": "Always show SQL before running it"}]}"#;
        let h = harness(FakeResolver::with_body(body));
        let opts = extraction_opts();

        h.service.run_extraction(opts.clone()).await.unwrap();

        let contents = h.repo.contents();
        assert_eq!(contents, vec!["Always show SQL before running it."]);

        let events = h.sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        let (event, props) = &events[0];
        assert_eq!(*event, AnalyticsEvent::MemoryExtractionCompleted);
        assert_eq!(props["new_memories_count"], 1);
        assert_eq!(props["superseded_memories_count"], 0);
        assert_eq!(props["input_tokens"], 100);
        assert_eq!(props["provider"], "anthropic");

        let records = h.ledger.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].model_id, opts.provider.extractor_model_id());
        assert_eq!(records[0].usage.output_tokens, 20);
    }

    #[tokio::test]
    async fn test_extraction_supersedes_known_and_drops_unknown() {
        let h = harness(FakeResolver::unresolvable());
        let old = h.repo.seed("Likes light mode.");
        let body = format!(
            r#"{{"user_profile": [
                {{"content": "Likes dark mode", "supersedes_id": "{}"}},
                {{"content": "Uses Python", "supersedes_id": "{}"}}
            ]}}"#,
            old.id,
            Uuid::now_v7()
        );
        let h = Harness {
            service: MemoryService::new(
                Arc::clone(&h.repo),
                Arc::new(FakeResolver::with_body(&body)),
                Arc::clone(&h.sink),
                Arc::clone(&h.ledger),
                TaskPool::new(8, 2),
            ),
            ..h
        };

        h.service.run_extraction(extraction_opts()).await.unwrap();

        let memories = h.repo.memories.lock().unwrap();
        // Superseding record inserted, unknown-reference record dropped.
        assert_eq!(memories.len(), 2);
        let old_row = memories.iter().find(|m| m.id == old.id).unwrap();
        assert!(old_row.superseded_by.is_some());
        let new_row = memories.iter().find(|m| m.supersedes_id == Some(old.id)).unwrap();
        assert_eq!(new_row.content, "Likes dark mode.");
        assert!(!memories.iter().any(|m| m.content.contains("Python")));
        drop(memories);

        let events = h.sink.events.lock().unwrap();
        let (_, props) = &events[0];
        assert_eq!(props["new_memories_count"], 0);
        assert_eq!(props["superseded_memories_count"], 1);
    }

    #[tokio::test]
    async fn test_extraction_disabled_is_noop() {
        let h = harness(FakeResolver::with_body(
            r#"{"user_profile": [{"content": "x"}]}"#,
        ));
        h.repo.disabled.store(true, Ordering::SeqCst);

        h.service.run_extraction(extraction_opts()).await.unwrap();

        assert!(h.repo.contents().is_empty());
        assert!(h.ledger.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_extraction_unresolvable_model_is_noop() {
        let h = harness(FakeResolver::unresolvable());

        h.service.run_extraction(extraction_opts()).await.unwrap();

        assert!(h.repo.contents().is_empty());
        assert!(h.sink.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_extraction_empty_output_skips_persistence_and_telemetry() {
        let h = harness(FakeResolver::with_body("{}"));

        h.service.run_extraction(extraction_opts()).await.unwrap();

        assert!(h.repo.contents().is_empty());
        assert!(h.sink.events.lock().unwrap().is_empty());
        assert!(h.ledger.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scheduled_extraction_failure_never_surfaces() {
        let h = harness(FakeResolver::failing_model());

        // Must not panic or propagate; the task boundary logs the failure.
        h.service.schedule_extraction(extraction_opts());
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(h.repo.contents().is_empty());
    }

    #[tokio::test]
    async fn test_scheduled_extraction_runs_in_background() {
        let body = r#"{"user_profile": [{"content": "Works in fintech"}]}"#;
        let h = harness(FakeResolver::with_body(body));

        h.service.schedule_extraction(extraction_opts());

        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while h.repo.contents().is_empty() {
            assert!(
                tokio::time::Instant::now() < deadline,
                "background extraction never persisted"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(h.repo.contents(), vec!["Works in fintech."]);
    }

    #[tokio::test]
    async fn test_concurrent_disjoint_extractions_both_persist() {
        let repo = Arc::new(FakeRepo::default());
        let sink = Arc::new(RecordingSink::default());
        let ledger = Arc::new(RecordingLedger::default());
        let tasks = TaskPool::new(8, 4);

        let service_a = MemoryService::new(
            Arc::clone(&repo),
            Arc::new(FakeResolver::with_body(
                r#"{"user_profile": [{"content": "Fact A"}]}"#,
            )),
            Arc::clone(&sink),
            Arc::clone(&ledger),
            tasks.clone(),
        );
        let service_b = MemoryService::new(
            Arc::clone(&repo),
            Arc::new(FakeResolver::with_body(
                r#"{"user_profile": [{"content": "Fact B"}]}"#,
            )),
            Arc::clone(&sink),
            Arc::clone(&ledger),
            tasks,
        );

        let (a, b) = tokio::join!(
            service_a.run_extraction(extraction_opts()),
            service_b.run_extraction(extraction_opts()),
        );
        a.unwrap();
        b.unwrap();

        let mut contents = repo.contents();
        contents.sort();
        assert_eq!(contents, vec!["Fact A.", "Fact B."]);
    }

    // --- User-facing mutations ---

    #[tokio::test]
    async fn test_edit_memory_normalizes_and_tracks() {
        let h = harness(FakeResolver::unresolvable());
        let memory = h.repo.seed("Old content.");

        let updated = h
            .service
            .edit_memory(Uuid::now_v7(), Uuid::now_v7(), memory.id, "  new   content  ")
            .await
            .unwrap();

        assert_eq!(updated.content, "new content.");
        let events = h.sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, AnalyticsEvent::MemoryUpdated);
    }

    #[tokio::test]
    async fn test_edit_memory_empty_content_rejected() {
        let h = harness(FakeResolver::unresolvable());
        let memory = h.repo.seed("Old content.");

        let result = h
            .service
            .edit_memory(Uuid::now_v7(), Uuid::now_v7(), memory.id, "   ")
            .await;
        assert!(matches!(result, Err(MemoryError::EmptyContent)));
    }

    #[tokio::test]
    async fn test_edit_memory_too_long_rejected() {
        let h = harness(FakeResolver::unresolvable());
        let memory = h.repo.seed("Old content.");

        let long = "x".repeat(1001);
        let result = h
            .service
            .edit_memory(Uuid::now_v7(), Uuid::now_v7(), memory.id, &long)
            .await;
        assert!(matches!(result, Err(MemoryError::ContentTooLong { .. })));
    }

    #[tokio::test]
    async fn test_edit_memory_not_found() {
        let h = harness(FakeResolver::unresolvable());
        let result = h
            .service
            .edit_memory(Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7(), "content")
            .await;
        assert!(matches!(result, Err(MemoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_memory_and_not_found() {
        let h = harness(FakeResolver::unresolvable());
        let memory = h.repo.seed("Delete me.");

        let deleted = h
            .service
            .delete_memory(Uuid::now_v7(), Uuid::now_v7(), memory.id)
            .await
            .unwrap();
        assert_eq!(deleted.id, memory.id);

        let again = h
            .service
            .delete_memory(Uuid::now_v7(), Uuid::now_v7(), memory.id)
            .await;
        assert!(matches!(again, Err(MemoryError::NotFound)));

        let events = h.sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, AnalyticsEvent::MemoryDeleted);
    }

    #[tokio::test]
    async fn test_set_enabled_updates_flag_and_tracks() {
        let h = harness(FakeResolver::unresolvable());

        h.service
            .set_enabled(Uuid::now_v7(), Uuid::now_v7(), false)
            .await
            .unwrap();
        assert!(h.repo.disabled.load(Ordering::SeqCst));

        let events = h.sink.events.lock().unwrap();
        assert_eq!(events[0].0, AnalyticsEvent::MemoryEnabledUpdated);
        assert_eq!(events[0].1["memory_enabled"], false);
    }

    #[tokio::test]
    async fn test_normalize_content_delegates() {
        let h = harness(FakeResolver::unresolvable());
        assert_eq!(h.service.normalize_content(" a  b "), "a b.");
    }
}
