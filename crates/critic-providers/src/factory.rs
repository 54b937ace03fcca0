//! Backend construction from configuration.

use std::sync::Arc;

use critic_core::{CriticConfig, Error, ModelBackend, ProviderKind, Result};
use tracing::info;

use crate::groq::GroqBackend;
use crate::ollama::{self, OllamaBackend};
use crate::openrouter::OpenRouterBackend;

/// Builds the backend selected by `config.backend.provider`.
///
/// # Errors
///
/// Returns [`Error::MissingApiKey`] when a hosted backend has no key in the
/// config file or environment.
pub fn create_backend(config: &CriticConfig) -> Result<Arc<dyn ModelBackend>> {
    let settings = &config.backend;
    let provider = settings.provider;
    let key_for = |env_hint: &str| {
        config
            .get_api_key(provider)
            .ok_or_else(|| Error::MissingApiKey(env_hint.to_owned()))
    };

    let backend: Arc<dyn ModelBackend> = match provider {
        ProviderKind::OpenRouter => {
            let mut backend = OpenRouterBackend::new(key_for(
                "OPENROUTER_API_KEY or config.toml openrouter_api_key",
            )?)?
            .with_sampling(settings.temperature, settings.max_tokens);
            if let Some(model) = &settings.model {
                backend = backend.with_model(model.clone());
            }
            if let Some(url) = &settings.base_url {
                backend = backend.with_url(url.clone());
            }
            Arc::new(backend)
        }
        ProviderKind::Groq => {
            let mut backend =
                GroqBackend::with_api_key_direct(key_for("GROQ_API_KEY or config.toml groq_api_key")?)?
                    .with_sampling(settings.temperature, settings.max_tokens);
            if let Some(model) = &settings.model {
                backend = backend.with_model(model.clone());
            }
            Arc::new(backend)
        }
        ProviderKind::Ollama => {
            let model = settings
                .model
                .clone()
                .unwrap_or_else(|| ollama::DEFAULT_MODEL.to_owned());
            let mut backend = OllamaBackend::new(model)
                .with_sampling(settings.temperature, settings.max_tokens);
            if let Some(url) = &settings.base_url {
                backend = backend.with_url(url.clone());
            }
            Arc::new(backend)
        }
    };

    info!(provider = %provider, "Model backend ready");
    Ok(backend)
}
