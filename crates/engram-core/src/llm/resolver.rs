//! ModelResolver trait definition.
//!
//! Turns a (project, provider, model id) triple into an invocable provider
//! handle. Resolution failure (missing credentials, unknown provider) is
//! not an error: it yields `None`, and the extraction orchestrator treats
//! that as a silent no-op.

use uuid::Uuid;

use engram_types::llm::ProviderKind;

use super::box_provider::BoxLlmProvider;

/// Resolves an invocable model handle for a project.
///
/// Implementations live in engram-infra (e.g., `EnvModelResolver`).
pub trait ModelResolver: Send + Sync {
    /// Resolve a provider handle pinned to `model_id`, or `None` when the
    /// project has no usable credentials for this provider.
    fn resolve(
        &self,
        project_id: Uuid,
        provider: ProviderKind,
        model_id: &str,
    ) -> impl std::future::Future<Output = Option<BoxLlmProvider>> + Send;
}
