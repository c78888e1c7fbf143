//! Memory subsystem for Engram.
//!
//! This module holds the full extraction path: content normalization, the
//! LLM extractor invocation, reconciliation of extractor output against the
//! user's existing memories, the `MemoryRepository` port the infrastructure
//! layer implements, and the orchestrating `MemoryService`.

pub mod extractor;
pub mod normalize;
pub mod reconciler;
pub mod service;
pub mod store;
