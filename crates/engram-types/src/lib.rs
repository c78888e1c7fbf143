//! Shared domain types for Engram.
//!
//! This crate contains the core domain types used across the Engram memory
//! service: memory records, extractor output shapes, LLM request/response
//! types, telemetry records, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror,
//! schemars.

pub mod config;
pub mod error;
pub mod llm;
pub mod memory;
pub mod telemetry;
