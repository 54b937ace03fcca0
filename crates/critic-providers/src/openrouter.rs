use std::time::Instant;

use async_trait::async_trait;
use critic_core::{Error, ModelBackend, OutputSchema, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::chat::{ChatRequest, send_chat};

/// `OpenRouter` API endpoint URL.
const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
/// Default model for `OpenRouter`.
pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-001";
/// Env var key for `OpenRouter` API key.
const ENV_OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";

/// Backend implementation for the `OpenRouter` API.
pub struct OpenRouterBackend {
    /// HTTP client for API requests.
    client: Client,
    /// `OpenRouter` API key.
    api_key: String,
    /// Model name to use.
    model: String,
    /// Chat completions URL.
    url: String,
    /// Sampling temperature.
    temperature: f32,
    /// Completion token limit.
    max_tokens: usize,
}

impl OpenRouterBackend {
    /// Creates a new `OpenRouterBackend` with the given API key.
    ///
    /// # Errors
    /// Returns an error if the provided API key is empty.
    pub fn new(api_key: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::MissingApiKey(ENV_OPENROUTER_API_KEY.to_owned()));
        }

        Ok(Self {
            client: Client::default(),
            api_key,
            model: DEFAULT_MODEL.to_owned(),
            url: OPENROUTER_API_URL.to_owned(),
            temperature: 0.4,
            max_tokens: 1024,
        })
    }

    /// Sets the model to use for generation.
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Points the backend at a compatible proxy instead of `OpenRouter` itself.
    #[must_use]
    pub fn with_url(mut self, url: String) -> Self {
        self.url = url;
        self
    }

    /// Sets sampling temperature and completion token limit.
    #[must_use]
    pub const fn with_sampling(mut self, temperature: f32, max_tokens: usize) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Model requests are sent to.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ModelBackend for OpenRouterBackend {
    fn name(&self) -> &'static str {
        "openrouter"
    }

    async fn invoke(&self, prompt: &str, schema: &OutputSchema) -> Result<Option<Value>> {
        let start = Instant::now();
        let request = ChatRequest::new(
            &self.model,
            prompt,
            schema,
            self.temperature,
            self.max_tokens,
        );

        let output = send_chat(&self.client, &self.url, &self.api_key, &request, "OpenRouter").await;

        debug!(
            model = %self.model,
            latency_ms = start.elapsed().as_millis() as u64,
            "OpenRouter call finished"
        );
        output
    }
}
