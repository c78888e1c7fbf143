//! LLM provider implementations.
//!
//! Concrete implementations of the [`LlmProvider`] trait defined in
//! `engram-core` (Anthropic Messages API, OpenAI-compatible chat
//! completions), plus the [`EnvModelResolver`] that turns a
//! (project, provider, model id) triple into an invocable handle using
//! API keys from the environment.
//!
//! [`LlmProvider`]: engram_core::llm::provider::LlmProvider
//! [`EnvModelResolver`]: resolver::EnvModelResolver

pub mod anthropic;
pub mod openai_compat;
pub mod resolver;
