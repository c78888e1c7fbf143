//! Memory extraction via LLM.
//!
//! `MemoryExtractor` runs one completion against the resolved extractor
//! model: the system prompt carries the extraction rules plus the JSON
//! schema of [`ExtractorOutput`]; the user turn carries the existing
//! memories (so the model can dedup and target supersessions) and the new
//! message batch.
//!
//! A malformed JSON reply logs a warning and counts as "nothing extracted";
//! transport and model failures propagate to the caller, whose background
//! task boundary logs and swallows them.

use std::sync::LazyLock;

use schemars::schema_for;
use serde::Serialize;
use uuid::Uuid;

use engram_types::llm::{CompletionRequest, LlmError, Message, MessageRole, TokenUsage};
use engram_types::memory::{ExtractorOutput, Memory};

use crate::llm::box_provider::BoxLlmProvider;

/// Extraction rules given to the model.
///
/// The model sees the user's existing memories and the latest conversation
/// slice, and returns standing instructions and profile facts worth keeping
/// across chats. Updates to an existing memory must cite its id.
const EXTRACTION_RULES: &str = r#"You are a memory extraction assistant for a data-analysis copilot. From the conversation below, extract durable information about the user worth remembering in future chats.

Rules:
1. Extract ONLY durable information: standing instructions ("always show SQL before running it") go in user_instructions; facts about the user themself ("works at a logistics company") go in user_profile.
2. Each item must be a single, self-contained sentence.
3. Do NOT repeat anything already present in the existing memories.
4. If the conversation contradicts or refines an existing memory, emit the corrected item and set its supersedes_id to that memory's id.
5. Do NOT include greetings, one-off requests, or details about the current question only.
6. If there is nothing worth extracting, return {}."#;

/// System prompt: rules plus the exact response schema.
static SYSTEM_PROMPT: LazyLock<String> = LazyLock::new(|| {
    let schema = schema_for!(ExtractorOutput);
    let schema_json =
        serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string());
    format!("{EXTRACTION_RULES}\n\nRespond with a single JSON object (no prose, no code fences) matching this schema:\n{schema_json}")
});

/// Upper bound on the extractor reply; extractions are short lists.
const MAX_OUTPUT_TOKENS: u32 = 1024;

/// Existing-memory view serialized into the prompt.
#[derive(Serialize)]
struct PromptMemory<'a> {
    id: Uuid,
    category: String,
    content: &'a str,
}

/// One successful extraction: structured output plus the tokens it cost.
#[derive(Debug)]
pub struct Extraction {
    pub output: ExtractorOutput,
    pub usage: TokenUsage,
}

/// Stateless wrapper around the extraction LLM call.
pub struct MemoryExtractor;

impl MemoryExtractor {
    /// Run one extraction over `messages` in the context of `existing`.
    ///
    /// Returns `Ok(None)` when there is nothing worth extracting: the
    /// message batch is empty, the model returned an empty object, or the
    /// reply was not parseable as [`ExtractorOutput`] (logged at warn).
    /// Provider failures propagate as [`LlmError`].
    #[tracing::instrument(
        name = "extract_memory",
        skip(provider, existing, messages),
        fields(
            model_id = %model_id,
            existing_count = existing.len(),
            message_count = messages.len(),
        )
    )]
    pub async fn extract(
        provider: &BoxLlmProvider,
        model_id: &str,
        existing: &[Memory],
        messages: &[Message],
    ) -> Result<Option<Extraction>, LlmError> {
        if messages.is_empty() {
            return Ok(None);
        }

        let request = CompletionRequest {
            model: model_id.to_string(),
            messages: vec![Message {
                role: MessageRole::User,
                content: build_user_turn(existing, messages),
            }],
            system: Some(SYSTEM_PROMPT.clone()),
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature: Some(0.0),
        };

        let response = provider.complete(&request).await?;
        let raw_content = response.content.trim();

        let output: ExtractorOutput = match serde_json::from_str(raw_content) {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    content_preview = &raw_content[..raw_content.len().min(200)],
                    "Failed to parse memory extraction JSON; treating as empty"
                );
                return Ok(None);
            }
        };

        if output.is_empty() {
            return Ok(None);
        }

        Ok(Some(Extraction {
            output,
            usage: response.usage,
        }))
    }
}

/// Serialize existing memories and the message batch into the user turn.
fn build_user_turn(existing: &[Memory], messages: &[Message]) -> String {
    let memories: Vec<PromptMemory<'_>> = existing
        .iter()
        .map(|m| PromptMemory {
            id: m.id,
            category: m.category.to_string(),
            content: &m.content,
        })
        .collect();
    let memories_json =
        serde_json::to_string_pretty(&memories).unwrap_or_else(|_| "[]".to_string());

    let mut transcript = String::new();
    for message in messages {
        transcript.push_str(&format!("{}: {}\n", message.role, message.content));
    }

    format!("Existing memories:\n{memories_json}\n\nConversation:\n{transcript}")
}
