//! Local backend talking to an Ollama server.

use std::time::Instant;

use async_trait::async_trait;
use critic_core::{Error, ModelBackend, OutputSchema, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::chat::{SYSTEM_PROMPT, ensure_success, parse_structured};

/// Default Ollama address.
pub const DEFAULT_URL: &str = "http://localhost:11434";
/// Default local model.
pub const DEFAULT_MODEL: &str = "qwen2.5-coder:7b";

/// Ollama API request for generation
#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'req> {
    /// Model to use for generation.
    model: &'req str,
    /// Input prompt for the model.
    prompt: &'req str,
    /// System prompt.
    system: &'req str,
    /// JSON Schema the output must follow.
    format: &'req Value,
    /// Sampling options.
    options: OllamaOptions,
    /// Whether to stream the response.
    stream: bool,
}

/// Sampling options understood by Ollama.
#[derive(Debug, Serialize)]
struct OllamaOptions {
    /// Sampling temperature.
    temperature: f32,
    /// Maximum tokens to generate.
    num_predict: usize,
}

/// Ollama API response for generation
#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    /// Generated text content.
    #[serde(default)]
    response: String,
    /// Number of tokens in the prompt.
    #[serde(default)]
    prompt_eval_count: usize,
    /// Number of tokens generated.
    #[serde(default)]
    eval_count: usize,
}

/// Local model backend using Ollama's structured output support.
pub struct OllamaBackend {
    /// HTTP client.
    client: Client,
    /// Server address.
    base_url: String,
    /// Model to run.
    model_name: String,
    /// Sampling temperature.
    temperature: f32,
    /// Completion token limit.
    max_tokens: usize,
}

impl OllamaBackend {
    /// Creates a backend for `model_name` on the default local server.
    #[must_use]
    pub fn new(model_name: String) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_URL.to_owned(),
            model_name,
            temperature: 0.4,
            max_tokens: 1024,
        }
    }

    /// Uses a different server address.
    #[must_use]
    pub fn with_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_owned();
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
impl ModelBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn invoke(&self, prompt: &str, schema: &OutputSchema) -> Result<Option<Value>> {
        let start = Instant::now();
        let request = OllamaGenerateRequest {
            model: &self.model_name,
            prompt,
            system: SYSTEM_PROMPT,
            format: schema.as_json(),
            options: OllamaOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        let response = ensure_success(response, "Ollama").await?;

        let ollama_response: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|err| Error::Provider(format!("Failed to parse Ollama response: {err}")))?;

        debug!(
            model = %self.model_name,
            prompt_tokens = ollama_response.prompt_eval_count,
            completion_tokens = ollama_response.eval_count,
            latency_ms = start.elapsed().as_millis() as u64,
            "Ollama call finished"
        );

        parse_structured(&ollama_response.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use critic_core::SchemaVariant;
    use serde_json::{json, to_value};

    #[test]
    fn local_backend_creation() {
        let backend = OllamaBackend::new(DEFAULT_MODEL.to_owned()).with_url("http://gpu-box:11434/".to_owned());
        assert_eq!(backend.name(), "ollama");
        assert_eq!(backend.model_name, DEFAULT_MODEL);
        assert_eq!(backend.base_url, "http://gpu-box:11434");
    }

    #[test]
    fn request_carries_schema_as_format() {
        let schema = OutputSchema::new(SchemaVariant::Extended);
        let request = OllamaGenerateRequest {
            model: DEFAULT_MODEL,
            prompt: "Review",
            system: SYSTEM_PROMPT,
            format: schema.as_json(),
            options: OllamaOptions {
                temperature: 0.5,
                num_predict: 128,
            },
            stream: false,
        };
        let value = to_value(&request).unwrap();
        assert_eq!(value["format"], *schema.as_json());
        assert_eq!(value["stream"], json!(false));
        assert_eq!(value["options"]["num_predict"], json!(128));
    }

    #[tokio::test]
    async fn unreachable_server_is_request_error() {
        let backend = OllamaBackend::new(DEFAULT_MODEL.to_owned()).with_url("http://127.0.0.1:9".to_owned());
        let error = backend
            .invoke("Review", &OutputSchema::new(SchemaVariant::Standard))
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Request(_)));
        assert!(!error.is_malformed_output());
    }

    #[test]
    fn empty_generation_is_no_output() {
        let response: OllamaGenerateResponse =
            serde_json::from_value(json!({"model": "m", "response": "", "done": true})).unwrap();
        assert_eq!(parse_structured(&response.response).unwrap(), None);
    }
}
