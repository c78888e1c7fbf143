//! Application state wiring all services together.
//!
//! AppState holds the concrete memory service used by both CLI and REST
//! API. The service is generic over its ports, but AppState pins it to the
//! concrete infra implementations. Constructed once at process start and
//! passed by reference to handlers -- no global singletons.

use std::path::PathBuf;
use std::sync::Arc;

use engram_core::memory::service::MemoryService;
use engram_core::task::TaskPool;
use engram_infra::analytics::PostHogSink;
use engram_infra::config::load_config;
use engram_infra::llm::resolver::EnvModelResolver;
use engram_infra::resolve_data_dir;
use engram_infra::sqlite::inference::SqliteInferenceLedger;
use engram_infra::sqlite::memory::SqliteMemoryRepository;
use engram_infra::sqlite::pool::DatabasePool;
use engram_types::config::AppConfig;

/// Concrete type alias for the service generics pinned to infra implementations.
pub type ConcreteMemoryService =
    MemoryService<SqliteMemoryRepository, EnvModelResolver, PostHogSink, SqliteInferenceLedger>;

/// Shared application state holding the memory service.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub memory_service: ConcreteMemoryService,
    pub config: AppConfig,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB, wire
    /// the service.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;

        // Initialize database
        let db_url = format!("sqlite://{}?mode=rwc", data_dir.join("engram.db").display());
        let db_pool = DatabasePool::new(&db_url).await?;

        // Wire the memory service with its ports
        let memory_repo = Arc::new(SqliteMemoryRepository::new(db_pool.clone()));
        let resolver = Arc::new(EnvModelResolver::new());
        let analytics = Arc::new(PostHogSink::new(&config.analytics));
        let ledger = Arc::new(SqliteInferenceLedger::new(db_pool.clone()));
        let tasks = TaskPool::new(
            config.extraction.queue_capacity,
            config.extraction.max_concurrent,
        );

        let memory_service = MemoryService::new(memory_repo, resolver, analytics, ledger, tasks);

        Ok(Self {
            memory_service,
            config,
            data_dir,
            db_pool,
        })
    }
}
