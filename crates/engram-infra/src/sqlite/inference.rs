//! SQLite inference ledger implementation.
//!
//! Implements `InferenceLedger` from `engram-core`: one row appended to
//! `llm_inferences` per billable model invocation.

use engram_core::telemetry::InferenceLedger;
use engram_types::error::RepositoryError;
use engram_types::telemetry::LlmInferenceRecord;
use chrono::{DateTime, Utc};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `InferenceLedger`.
pub struct SqliteInferenceLedger {
    pool: DatabasePool,
}

impl SqliteInferenceLedger {
    /// Create a new ledger backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

impl InferenceLedger for SqliteInferenceLedger {
    async fn insert_llm_inference(
        &self,
        record: &LlmInferenceRecord,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO llm_inferences (id, project_id, user_id, chat_id, inference_type, llm_provider, llm_model_id, input_tokens, output_tokens, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(record.id.to_string())
        .bind(record.project_id.to_string())
        .bind(record.user_id.to_string())
        .bind(record.chat_id.to_string())
        .bind(record.inference_type.to_string())
        .bind(record.provider.to_string())
        .bind(&record.model_id)
        .bind(record.usage.input_tokens as i64)
        .bind(record.usage.output_tokens as i64)
        .bind(format_datetime(&record.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engram_types::llm::{ProviderKind, TokenUsage};
    use engram_types::telemetry::InferenceType;
    use sqlx::Row;
    use uuid::Uuid;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_llm_inference() {
        let pool = test_pool().await;
        let ledger = SqliteInferenceLedger::new(pool.clone());

        let record = LlmInferenceRecord {
            id: Uuid::now_v7(),
            project_id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            chat_id: Uuid::now_v7(),
            inference_type: InferenceType::MemoryExtraction,
            provider: ProviderKind::Anthropic,
            model_id: "claude-3-5-haiku-latest".to_string(),
            usage: TokenUsage {
                input_tokens: 1500,
                output_tokens: 120,
            },
            created_at: Utc::now(),
        };

        ledger.insert_llm_inference(&record).await.unwrap();

        let row = sqlx::query("SELECT * FROM llm_inferences WHERE id = ?")
            .bind(record.id.to_string())
            .fetch_one(&pool.reader)
            .await
            .unwrap();

        let inference_type: String = row.try_get("inference_type").unwrap();
        let provider: String = row.try_get("llm_provider").unwrap();
        let input_tokens: i64 = row.try_get("input_tokens").unwrap();
        assert_eq!(inference_type, "memory_extraction");
        assert_eq!(provider, "anthropic");
        assert_eq!(input_tokens, 1500);
    }
}
