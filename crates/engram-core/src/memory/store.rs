//! MemoryRepository trait definition.
//!
//! Persistence port for user memories and the per-(user, project)
//! enablement flag. Uses native async fn in traits (RPITIT, Rust 2024
//! edition); implementations live in engram-infra (e.g.,
//! `SqliteMemoryRepository`).

use engram_types::error::RepositoryError;
use engram_types::memory::{Memory, NewMemory};
use uuid::Uuid;

/// Repository trait for user memory persistence.
pub trait MemoryRepository: Send + Sync {
    /// Get a user's active (non-superseded) memories in creation order,
    /// optionally excluding those that originated from one chat.
    fn get_user_memories(
        &self,
        user_id: &Uuid,
        exclude_chat_id: Option<&Uuid>,
    ) -> impl std::future::Future<Output = Result<Vec<Memory>, RepositoryError>> + Send;

    /// Persist a batch in one write transaction: insert every record, and
    /// for records with a supersedes-id mark the referenced memory
    /// superseded. Must be safe to call concurrently for the same user;
    /// conflicting supersessions resolve last-write-wins.
    fn upsert_and_supersede(
        &self,
        records: &[NewMemory],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Whether memory is enabled for this (user, project) pair.
    /// Absent settings default to enabled.
    fn get_memory_enabled(
        &self,
        user_id: &Uuid,
        project_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Set the enablement flag for this (user, project) pair.
    fn set_memory_enabled(
        &self,
        user_id: &Uuid,
        project_id: &Uuid,
        enabled: bool,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Replace a memory's content. Returns the updated memory, or `None`
    /// when the id does not exist or belongs to another user.
    fn update_memory_content(
        &self,
        user_id: &Uuid,
        memory_id: &Uuid,
        content: &str,
    ) -> impl std::future::Future<Output = Result<Option<Memory>, RepositoryError>> + Send;

    /// Delete a memory. Returns the deleted memory, or `None` when the id
    /// does not exist or belongs to another user.
    fn delete_memory(
        &self,
        user_id: &Uuid,
        memory_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Memory>, RepositoryError>> + Send;
}
