//! Memory types for Engram.
//!
//! These types model the user's long-term memory: instructions and profile
//! facts extracted from conversations that persist across chats and are
//! injected into future agent context.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::llm::{Message, ProviderKind};

/// Category of a memory record.
///
/// Extracted user instructions become global rules; extracted profile
/// observations become personal facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryCategory {
    GlobalRule,
    PersonalFact,
}

impl fmt::Display for MemoryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryCategory::GlobalRule => write!(f, "global_rule"),
            MemoryCategory::PersonalFact => write!(f, "personal_fact"),
        }
    }
}

impl FromStr for MemoryCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "global_rule" => Ok(MemoryCategory::GlobalRule),
            "personal_fact" => Ok(MemoryCategory::PersonalFact),
            other => Err(format!("invalid memory category: '{other}'")),
        }
    }
}

/// A persisted fact or instruction about a user.
///
/// Memories are user-scoped and chat-linked. A memory can be superseded by
/// a newer one (e.g., the user changes a stated preference); superseded rows
/// are kept but excluded from context injection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: Uuid,
    pub user_id: Uuid,
    /// The chat whose messages produced this memory.
    pub chat_id: Uuid,
    pub category: MemoryCategory,
    /// Normalized free text (trimmed, single-spaced, terminal punctuation).
    pub content: String,
    /// The memory this one replaced, if any.
    pub supersedes_id: Option<Uuid>,
    /// Set by the store when a later memory replaces this one.
    pub superseded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable memory produced by the reconciler.
///
/// The store assigns id and timestamps; `supersedes_id` (when present) is
/// guaranteed by the reconciler to reference a memory the user owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMemory {
    pub user_id: Uuid,
    pub chat_id: Uuid,
    pub category: MemoryCategory,
    pub content: String,
    pub supersedes_id: Option<Uuid>,
}

/// Minimal projection of a memory for system-prompt injection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryProjection {
    pub category: MemoryCategory,
    pub content: String,
}

impl From<&Memory> for MemoryProjection {
    fn from(memory: &Memory) -> Self {
        Self {
            category: memory.category,
            content: memory.content.clone(),
        }
    }
}

/// One extracted instruction or profile fact as returned by the LLM.
///
/// `supersedes_id` is the raw model output: it may be missing, malformed,
/// or reference a memory the user does not own. The reconciler validates it
/// against the existing-memory snapshot before anything is persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedItem {
    /// The instruction or fact, one self-contained sentence.
    pub content: String,
    /// Id of an existing memory this item replaces, if the model judged it
    /// outdated by the new conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supersedes_id: Option<String>,
}

/// Structured output of one extraction call.
///
/// Both sequences are optional: an absent or empty pair means the model
/// found nothing worth remembering.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExtractorOutput {
    /// Standing instructions about how the assistant should behave.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_instructions: Option<Vec<ExtractedItem>>,
    /// Durable facts about the user themself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<Vec<ExtractedItem>>,
}

impl ExtractorOutput {
    /// True when neither sequence contains any item.
    pub fn is_empty(&self) -> bool {
        self.user_instructions.as_ref().is_none_or(|v| v.is_empty())
            && self.user_profile.as_ref().is_none_or(|v| v.is_empty())
    }
}

/// Request context for one background extraction run.
///
/// Constructed per chat turn, never persisted.
#[derive(Debug, Clone)]
pub struct MemoryExtractionOptions {
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub chat_id: Uuid,
    pub provider: ProviderKind,
    /// Messages exchanged since the last extraction.
    pub messages: Vec<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_category_roundtrip() {
        for cat in [MemoryCategory::GlobalRule, MemoryCategory::PersonalFact] {
            let s = cat.to_string();
            let parsed: MemoryCategory = s.parse().unwrap();
            assert_eq!(cat, parsed);
        }
    }

    #[test]
    fn test_memory_category_serde() {
        let cat = MemoryCategory::GlobalRule;
        let json = serde_json::to_string(&cat).unwrap();
        assert_eq!(json, "\"global_rule\"");
        let parsed: MemoryCategory = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, MemoryCategory::GlobalRule);
    }

    #[test]
    fn test_extractor_output_empty_variants() {
        assert!(ExtractorOutput::default().is_empty());

        let empty_lists = ExtractorOutput {
            user_instructions: Some(Vec::new()),
            user_profile: Some(Vec::new()),
        };
        assert!(empty_lists.is_empty());

        let with_item = ExtractorOutput {
            user_instructions: Some(vec![ExtractedItem {
                content: "Always answer in French.".to_string(),
                supersedes_id: None,
            }]),
            user_profile: None,
        };
        assert!(!with_item.is_empty());
    }

    #[test]
    fn test_extractor_output_deserialize_missing_fields() {
        let output: ExtractorOutput = serde_json::from_str("{}").unwrap();
        assert!(output.user_instructions.is_none());
        assert!(output.user_profile.is_none());
    }

    #[test]
    fn test_extracted_item_deserialize_with_supersedes() {
        let json = r#"{"content": "Prefers dark mode", "supersedes_id": "0192d3a0-0000-7000-8000-000000000001"}"#;
        let item: ExtractedItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.content, "Prefers dark mode");
        assert!(item.supersedes_id.is_some());
    }

    #[test]
    fn test_memory_projection_from_memory() {
        let memory = Memory {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            chat_id: Uuid::now_v7(),
            category: MemoryCategory::PersonalFact,
            content: "Works as a data engineer.".to_string(),
            supersedes_id: None,
            superseded_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let projection = MemoryProjection::from(&memory);
        assert_eq!(projection.category, MemoryCategory::PersonalFact);
        assert_eq!(projection.content, "Works as a data engineer.");
    }
}
