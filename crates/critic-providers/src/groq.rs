use std::time::Instant;

use async_trait::async_trait;
use critic_core::{Error, ModelBackend, OutputSchema, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::chat::{ChatRequest, send_chat};

/// Groq API endpoint URL.
const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
/// Default model for Groq.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
/// Env var key for Groq API key.
const ENV_GROQ_API_KEY: &str = "GROQ_API_KEY";

/// Groq API backend (free tier with rate limits).
pub struct GroqBackend {
    /// HTTP client for API requests.
    client: Client,
    /// Groq API key.
    api_key: String,
    /// Model name to use.
    model: String,
    /// Sampling temperature.
    temperature: f32,
    /// Completion token limit.
    max_tokens: usize,
}

impl GroqBackend {
    /// Creates a new `GroqBackend` with the given API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the provided API key is empty.
    pub fn with_api_key_direct(api_key: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::MissingApiKey(ENV_GROQ_API_KEY.to_owned()));
        }

        Ok(Self {
            client: Client::default(),
            api_key,
            model: DEFAULT_MODEL.to_owned(),
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

    /// Sets sampling temperature and completion token limit.
    #[must_use]
    pub const fn with_sampling(mut self, temperature: f32, max_tokens: usize) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl ModelBackend for GroqBackend {
    fn name(&self) -> &'static str {
        "groq"
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

        let output = send_chat(&self.client, GROQ_API_URL, &self.api_key, &request, "Groq").await;

        debug!(
            model = %self.model,
            latency_ms = start.elapsed().as_millis() as u64,
            "Groq call finished"
        );
        output
    }
}
