//! Infrastructure layer for Engram.
//!
//! Contains implementations of the port traits defined in `engram-core`:
//! SQLite storage for memories and the inference ledger, LLM provider
//! clients (Anthropic, OpenAI-compatible), the environment-based model
//! resolver, and the product analytics sink.

pub mod analytics;
pub mod config;
pub mod llm;
pub mod sqlite;

use std::path::PathBuf;

/// Resolve the data directory: `ENGRAM_DATA_DIR`, falling back to
/// `~/.engram`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ENGRAM_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".engram")
}
