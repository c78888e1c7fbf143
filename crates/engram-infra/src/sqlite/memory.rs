//! SQLite memory repository implementation.
//!
//! Implements `MemoryRepository` from `engram-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, reader pool for
//! SELECTs, writer pool for mutations. The batch upsert-and-supersede runs
//! in a single transaction on the single-connection writer, so concurrent
//! extraction runs for the same user serialize at the store and resolve
//! conflicting supersessions last-write-wins.

use engram_core::memory::store::MemoryRepository;
use engram_types::error::RepositoryError;
use engram_types::memory::{Memory, MemoryCategory, NewMemory};
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `MemoryRepository`.
pub struct SqliteMemoryRepository {
    pool: DatabasePool,
}

impl SqliteMemoryRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

/// Internal row type for mapping SQLite rows to domain Memory.
struct MemoryRow {
    id: String,
    user_id: String,
    chat_id: String,
    category: String,
    content: String,
    supersedes_id: Option<String>,
    superseded_by: Option<String>,
    created_at: String,
    updated_at: String,
}

impl MemoryRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            chat_id: row.try_get("chat_id")?,
            category: row.try_get("category")?,
            content: row.try_get("content")?,
            supersedes_id: row.try_get("supersedes_id")?,
            superseded_by: row.try_get("superseded_by")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_memory(self) -> Result<Memory, RepositoryError> {
        let id = parse_uuid(&self.id, "memory id")?;
        let user_id = parse_uuid(&self.user_id, "user_id")?;
        let chat_id = parse_uuid(&self.chat_id, "chat_id")?;
        let category: MemoryCategory = self
            .category
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let supersedes_id = self
            .supersedes_id
            .as_deref()
            .map(|s| parse_uuid(s, "supersedes_id"))
            .transpose()?;
        let superseded_by = self
            .superseded_by
            .as_deref()
            .map(|s| parse_uuid(s, "superseded_by"))
            .transpose()?;
        let created_at = parse_datetime(&self.created_at)?;
        let updated_at = parse_datetime(&self.updated_at)?;

        Ok(Memory {
            id,
            user_id,
            chat_id,
            category,
            content: self.content,
            supersedes_id,
            superseded_by,
            created_at,
            updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_uuid(s: &str, field: &str) -> Result<Uuid, RepositoryError> {
    Uuid::parse_str(s).map_err(|e| RepositoryError::Query(format!("invalid {field}: {e}")))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn rows_to_memories(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<Memory>, RepositoryError> {
    let mut memories = Vec::with_capacity(rows.len());
    for row in rows {
        let memory_row =
            MemoryRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
        memories.push(memory_row.into_memory()?);
    }
    Ok(memories)
}

// ---------------------------------------------------------------------------
// MemoryRepository implementation
// ---------------------------------------------------------------------------

impl MemoryRepository for SqliteMemoryRepository {
    async fn get_user_memories(
        &self,
        user_id: &Uuid,
        exclude_chat_id: Option<&Uuid>,
    ) -> Result<Vec<Memory>, RepositoryError> {
        let rows = match exclude_chat_id {
            Some(chat_id) => {
                sqlx::query(
                    r#"SELECT * FROM memories
                       WHERE user_id = ? AND superseded_by IS NULL AND chat_id != ?
                       ORDER BY created_at, id"#,
                )
                .bind(user_id.to_string())
                .bind(chat_id.to_string())
                .fetch_all(&self.pool.reader)
                .await
            }
            None => {
                sqlx::query(
                    r#"SELECT * FROM memories
                       WHERE user_id = ? AND superseded_by IS NULL
                       ORDER BY created_at, id"#,
                )
                .bind(user_id.to_string())
                .fetch_all(&self.pool.reader)
                .await
            }
        }
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows_to_memories(&rows)
    }

    async fn upsert_and_supersede(&self, records: &[NewMemory]) -> Result<(), RepositoryError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        for record in records {
            let id = Uuid::now_v7();
            let now = format_datetime(&Utc::now());

            if let Some(superseded) = record.supersedes_id {
                sqlx::query(
                    r#"UPDATE memories SET superseded_by = ?, updated_at = ?
                       WHERE id = ? AND user_id = ?"#,
                )
                .bind(id.to_string())
                .bind(&now)
                .bind(superseded.to_string())
                .bind(record.user_id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            }

            sqlx::query(
                r#"INSERT INTO memories (id, user_id, chat_id, category, content, supersedes_id, superseded_by, created_at, updated_at)
                   VALUES (?, ?, ?, ?, ?, ?, NULL, ?, ?)"#,
            )
            .bind(id.to_string())
            .bind(record.user_id.to_string())
            .bind(record.chat_id.to_string())
            .bind(record.category.to_string())
            .bind(&record.content)
            .bind(record.supersedes_id.map(|id| id.to_string()))
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get_memory_enabled(
        &self,
        user_id: &Uuid,
        project_id: &Uuid,
    ) -> Result<bool, RepositoryError> {
        let row = sqlx::query(
            "SELECT memory_enabled FROM memory_settings WHERE user_id = ? AND project_id = ?",
        )
        .bind(user_id.to_string())
        .bind(project_id.to_string())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        // Absent settings row defaults to enabled.
        match row {
            Some(row) => {
                let enabled: i64 = row
                    .try_get("memory_enabled")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(enabled != 0)
            }
            None => Ok(true),
        }
    }

    async fn set_memory_enabled(
        &self,
        user_id: &Uuid,
        project_id: &Uuid,
        enabled: bool,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO memory_settings (user_id, project_id, memory_enabled, updated_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT (user_id, project_id)
               DO UPDATE SET memory_enabled = excluded.memory_enabled, updated_at = excluded.updated_at"#,
        )
        .bind(user_id.to_string())
        .bind(project_id.to_string())
        .bind(if enabled { 1i64 } else { 0i64 })
        .bind(format_datetime(&Utc::now()))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn update_memory_content(
        &self,
        user_id: &Uuid,
        memory_id: &Uuid,
        content: &str,
    ) -> Result<Option<Memory>, RepositoryError> {
        let result = sqlx::query(
            "UPDATE memories SET content = ?, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(content)
        .bind(format_datetime(&Utc::now()))
        .bind(memory_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let row = sqlx::query("SELECT * FROM memories WHERE id = ?")
            .bind(memory_id.to_string())
            .fetch_one(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let memory_row =
            MemoryRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(Some(memory_row.into_memory()?))
    }

    async fn delete_memory(
        &self,
        user_id: &Uuid,
        memory_id: &Uuid,
    ) -> Result<Option<Memory>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM memories WHERE id = ? AND user_id = ?")
            .bind(memory_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let memory_row =
            MemoryRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
        let memory = memory_row.into_memory()?;

        sqlx::query("DELETE FROM memories WHERE id = ? AND user_id = ?")
            .bind(memory_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(Some(memory))
    }
}
