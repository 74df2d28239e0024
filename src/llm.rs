//! LLM collaborator: role-tagged messages in, one completion out.
//!
//! The pipeline depends on the [`CompletionClient`] trait rather than a
//! concrete provider, so tests can substitute a canned completion and the
//! orchestrator's error handling stays an explicit, visible policy. The
//! production implementation, [`ProviderClient`], wraps an edgequake-llm
//! provider (OpenAI, Anthropic, Gemini, Ollama, …) resolved once at startup.
//!
//! There is no retry or backoff here: each job makes exactly one call and
//! reports whatever came back.

use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::debug;

/// Model used when neither config nor environment names one.
/// Matches the model the extraction prompt was tuned against.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// One completion from the model, with token accounting.
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// The LLM collaborator interface.
///
/// Implementations are long-lived and shared read-only across jobs.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Request a single completion for the given messages.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: usize,
    ) -> Result<Completion, ExtractError>;
}

/// Production client backed by an edgequake-llm provider.
pub struct ProviderClient {
    provider: Arc<dyn LLMProvider>,
}

impl ProviderClient {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl CompletionClient for ProviderClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: usize,
    ) -> Result<Completion, ExtractError> {
        let options = CompletionOptions {
            temperature: Some(temperature),
            max_tokens: Some(max_tokens),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(messages, Some(&options))
            .await
            .map_err(|e| ExtractError::LlmApi {
                message: format!("{e}"),
            })?;

        debug!(
            "Completion: {} prompt tokens, {} completion tokens",
            response.prompt_tokens, response.completion_tokens
        );

        Ok(Completion {
            content: response.content,
            prompt_tokens: response.prompt_tokens as u32,
            completion_tokens: response.completion_tokens as u32,
        })
    }
}

/// Instantiate a named provider with the given model.
fn create_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn CompletionClient>, ExtractError> {
    let provider = ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        ExtractError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })?;
    Ok(Arc::new(ProviderClient::new(provider)))
}

/// Resolve the completion client, from most-specific to least-specific.
///
/// 1. **Pre-built client** (`config.client`) — used as-is. This is the seam
///    tests and middleware use.
/// 2. **Named provider + model** (`config.provider_name`) — the factory reads
///    the matching API key (`OPENAI_API_KEY`, …) from the environment.
/// 3. **Environment pair** (`RATECON_LLM_PROVIDER` + `RATECON_MODEL`) — both
///    set means the execution environment chose; honoured before
///    auto-detection so the choice wins even with multiple keys present.
/// 4. **OpenAI key present** — the extraction prompt was written against
///    OpenAI models, so an `OPENAI_API_KEY` wins over other detected keys.
/// 5. **Full auto-detection** — the factory scans all known key variables.
///
/// Failing all five is a startup error; per-job code never sees an
/// unconfigured client.
pub fn resolve_client(config: &ExtractorConfig) -> Result<Arc<dyn CompletionClient>, ExtractError> {
    if let Some(ref client) = config.client {
        return Ok(Arc::clone(client));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("RATECON_LLM_PROVIDER"),
        std::env::var("RATECON_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_provider("openai", model);
        }
    }

    let (provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| ExtractError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                 Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                 Error: {e}"
            ),
        })?;

    Ok(Arc::new(ProviderClient::new(provider)))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedClient;

    #[async_trait]
    impl CompletionClient for CannedClient {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _temperature: f32,
            _max_tokens: usize,
        ) -> Result<Completion, ExtractError> {
            Ok(Completion {
                content: "{}".into(),
                prompt_tokens: 1,
                completion_tokens: 1,
            })
        }
    }

    #[test]
    fn prebuilt_client_short_circuits_resolution() {
        let canned: Arc<dyn CompletionClient> = Arc::new(CannedClient);
        let config = ExtractorConfig::builder()
            .client(Arc::clone(&canned))
            .build()
            .unwrap();

        // No API keys needed: the pre-built client wins before any factory call.
        let resolved = resolve_client(&config).unwrap();
        assert!(Arc::ptr_eq(&resolved, &canned));
    }

    #[tokio::test]
    async fn canned_client_round_trip() {
        let client = CannedClient;
        let messages = vec![ChatMessage::system("s"), ChatMessage::user("u")];
        let completion = client.complete(&messages, 0.0, 16).await.unwrap();
        assert_eq!(completion.content, "{}");
    }
}
