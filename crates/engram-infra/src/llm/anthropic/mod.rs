//! Anthropic Claude LLM provider implementation.
//!
//! This module provides the [`AnthropicProvider`] which implements the
//! [`LlmProvider`](engram_core::llm::provider::LlmProvider) trait for the
//! Anthropic Messages API. Extraction calls are non-streaming.

pub mod client;
pub mod types;

pub use client::AnthropicProvider;
