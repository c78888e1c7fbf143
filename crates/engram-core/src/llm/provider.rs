//! LlmProvider trait definition.
//!
//! This is the core abstraction all LLM backends implement. Memory
//! extraction only ever needs a full (non-streaming) completion, so the
//! trait is a single `complete` method using native async fn in traits
//! (RPITIT, Rust 2024 edition).

use engram_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for LLM provider backends (Anthropic, OpenAI-compatible).
///
/// Implementations live in engram-infra (e.g., `AnthropicProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "anthropic", "openai").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
