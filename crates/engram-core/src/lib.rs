//! Business logic and port trait definitions for Engram.
//!
//! This crate defines the "ports" (repository, resolver, sink traits) that
//! the infrastructure layer implements, plus the memory subsystem itself:
//! normalizer, extractor invocation, reconciler, and the orchestrating
//! `MemoryService`. It depends only on `engram-types` -- never on
//! `engram-infra` or any database/IO crate.

pub mod llm;
pub mod memory;
pub mod task;
pub mod telemetry;
