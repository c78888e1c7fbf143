//! Observability setup for Engram.
//!
//! Tracing subscriber initialization (structured fmt layer with optional
//! OpenTelemetry export) and OTel GenAI semantic-convention attribute
//! constants for instrumenting extraction LLM calls.

pub mod genai_attrs;
pub mod tracing_setup;
