//! Environment-based model resolver.
//!
//! Resolves a (project, provider, model id) triple to an invocable
//! provider handle using API keys from environment variables. Key
//! resolution checks a project-scoped variable first
//! (`ENGRAM_{PROJECT_ID}_{KEY}`), then the plain key name.
//!
//! A missing or empty key is not an error: resolution yields `None` and
//! the extraction orchestrator no-ops.

use secrecy::SecretString;
use uuid::Uuid;

use engram_core::llm::box_provider::BoxLlmProvider;
use engram_core::llm::resolver::ModelResolver;
use engram_types::llm::ProviderKind;

use super::anthropic::AnthropicProvider;
use super::openai_compat::OpenAiCompatibleProvider;

/// Model resolver backed by environment variables.
pub struct EnvModelResolver;

impl EnvModelResolver {
    /// Create a new environment-based resolver.
    pub fn new() -> Self {
        Self
    }

    fn key_name(provider: ProviderKind) -> &'static str {
        match provider {
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
            ProviderKind::OpenAi => "OPENAI_API_KEY",
        }
    }

    /// Look up the API key: project-scoped variable first, then global.
    fn lookup_api_key(project_id: Uuid, provider: ProviderKind) -> Option<String> {
        let key = Self::key_name(provider);
        let scoped = format!(
            "ENGRAM_{}_{}",
            project_id.to_string().replace('-', "_").to_uppercase(),
            key
        );
        for name in [scoped.as_str(), key] {
            if let Ok(value) = std::env::var(name) {
                if !value.trim().is_empty() {
                    return Some(value);
                }
            }
        }
        None
    }
}

impl Default for EnvModelResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelResolver for EnvModelResolver {
    async fn resolve(
        &self,
        project_id: Uuid,
        provider: ProviderKind,
        model_id: &str,
    ) -> Option<BoxLlmProvider> {
        let Some(api_key) = Self::lookup_api_key(project_id, provider) else {
            tracing::debug!(
                provider = %provider,
                project_id = %project_id,
                "No API key configured; model unresolvable"
            );
            return None;
        };

        Some(match provider {
            ProviderKind::Anthropic => BoxLlmProvider::new(AnthropicProvider::new(
                SecretString::from(api_key),
                model_id.to_string(),
            )),
            ProviderKind::OpenAi => {
                BoxLlmProvider::new(OpenAiCompatibleProvider::openai(&api_key, model_id))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_resolves_to_none() {
        // Fresh project id guarantees no scoped var; clear the global one.
        // SAFETY: tests in this module manipulate distinct var names.
        unsafe { std::env::remove_var("OPENAI_API_KEY") };

        let resolver = EnvModelResolver::new();
        let handle = resolver
            .resolve(Uuid::now_v7(), ProviderKind::OpenAi, "gpt-4o-mini")
            .await;
        assert!(handle.is_none());
    }

    #[tokio::test]
    async fn test_project_scoped_key_resolves() {
        let project_id = Uuid::now_v7();
        let scoped = format!(
            "ENGRAM_{}_ANTHROPIC_API_KEY",
            project_id.to_string().replace('-', "_").to_uppercase()
        );
        // SAFETY: var name is unique to this test's project id.
        unsafe { std::env::set_var(&scoped, "sk-ant-scoped") };

        let resolver = EnvModelResolver::new();
        let handle = resolver
            .resolve(project_id, ProviderKind::Anthropic, "claude-3-5-haiku-latest")
            .await
            .expect("handle expected");
        assert_eq!(handle.name(), "anthropic");

        // SAFETY: removing the var this test just set.
        unsafe { std::env::remove_var(&scoped) };
    }
}
