//! Reconciliation of extractor output against existing memories.
//!
//! Turns the raw LLM extraction into a minimal batch of persistable
//! records plus supersession bookkeeping. The reconciler never produces a
//! dangling reference: a supersedes-id is honored only when it names a
//! memory present in the snapshot the extractor saw, and an item citing an
//! unknown id is discarded entirely.

use std::collections::HashSet;

use uuid::Uuid;

use engram_types::memory::{ExtractedItem, ExtractorOutput, Memory, MemoryCategory, NewMemory};

use super::normalize::normalize_memory_content;

/// Result of reconciling one extraction run.
#[derive(Debug, Default)]
pub struct ReconciledBatch {
    /// Records to persist in a single upsert-and-supersede call.
    pub records: Vec<NewMemory>,
    /// Surviving records without a supersedes-id.
    pub new_count: usize,
    /// Surviving records replacing an existing memory.
    pub superseded_count: usize,
}

/// Reconcile extractor output into persistable records.
///
/// Instructions map to [`MemoryCategory::GlobalRule`], profile facts to
/// [`MemoryCategory::PersonalFact`]. Content is normalized; items that
/// normalize to empty are dropped. Items citing a supersedes-id outside the
/// `existing` snapshot are dropped entirely. `new_count + superseded_count`
/// always equals `records.len()`.
pub fn reconcile(
    user_id: Uuid,
    chat_id: Uuid,
    existing: &[Memory],
    output: &ExtractorOutput,
) -> ReconciledBatch {
    let known_ids: HashSet<Uuid> = existing.iter().map(|m| m.id).collect();

    let instructions = output.user_instructions.as_deref().unwrap_or_default();
    let profile = output.user_profile.as_deref().unwrap_or_default();

    let records: Vec<NewMemory> = to_records(instructions, MemoryCategory::GlobalRule, user_id, chat_id)
        .chain(to_records(profile, MemoryCategory::PersonalFact, user_id, chat_id))
        .filter(|record| match record.supersedes_id {
            Some(id) => known_ids.contains(&id),
            None => true,
        })
        .collect();

    let superseded_count = records.iter().filter(|r| r.supersedes_id.is_some()).count();
    let new_count = records.len() - superseded_count;

    ReconciledBatch {
        records,
        new_count,
        superseded_count,
    }
}

/// Map extracted items to insertable records, dropping empty content.
///
/// A malformed supersedes-id (not a UUID) can never match a known memory,
/// so it surfaces as `Some(Uuid::nil())` and is filtered out with the rest
/// of the unknown references.
fn to_records<'a>(
    items: &'a [ExtractedItem],
    category: MemoryCategory,
    user_id: Uuid,
    chat_id: Uuid,
) -> impl Iterator<Item = NewMemory> + 'a {
    items.iter().filter_map(move |item| {
        let content = normalize_memory_content(&item.content);
        if content.is_empty() {
            return None;
        }
        let supersedes_id = item
            .supersedes_id
            .as_deref()
            .map(|raw| Uuid::parse_str(raw).unwrap_or(Uuid::nil()));
        Some(NewMemory {
            user_id,
            chat_id,
            category,
            content,
            supersedes_id,
        })
    })
}
