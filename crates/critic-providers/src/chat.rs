//! Wire types and helpers shared by OpenAI-compatible chat completion APIs.

use critic_core::{Error, OutputSchema, Result};
use reqwest::{Client, Response as HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::{Value, from_str};
use tracing::debug;

/// System message sent ahead of every rendered prompt.
pub const SYSTEM_PROMPT: &str = "You are a friendly code reviewer. Always answer with a single JSON object that matches the requested schema and nothing else.";

/// Request payload for `/chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'req> {
    /// Model identifier.
    pub model: &'req str,
    /// System and user messages.
    pub messages: [ChatMessage<'req>; 2],
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum number of completion tokens.
    pub max_tokens: usize,
    /// Structured output declaration.
    pub response_format: ResponseFormat<'req>,
}

impl<'req> ChatRequest<'req> {
    /// Builds a request carrying `prompt` and the declared `schema`.
    pub fn new(
        model: &'req str,
        prompt: &'req str,
        schema: &'req OutputSchema,
        temperature: f32,
        max_tokens: usize,
    ) -> Self {
        Self {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature,
            max_tokens,
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: schema.name(),
                    strict: false,
                    schema: schema.as_json(),
                },
            },
        }
    }
}

/// Message delivered to the API.
#[derive(Debug, Serialize)]
pub struct ChatMessage<'req> {
    /// Role of the message author (`system` or `user`).
    pub role: &'static str,
    /// Textual content of the message.
    pub content: &'req str,
}

/// `response_format` object.
#[derive(Debug, Serialize)]
pub struct ResponseFormat<'req> {
    /// Always `json_schema`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Named schema.
    pub json_schema: JsonSchemaFormat<'req>,
}

/// Named JSON Schema for constrained decoding.
#[derive(Debug, Serialize)]
pub struct JsonSchemaFormat<'req> {
    /// Schema identifier.
    pub name: &'static str,
    /// Whether the API must reject schema features it cannot enforce.
    pub strict: bool,
    /// The schema document.
    pub schema: &'req Value,
}

/// Response payload from `/chat/completions`.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Candidate completions.
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    /// Token accounting, when reported.
    pub usage: Option<ChatUsage>,
}

/// A single completion choice.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    /// Generated message.
    pub message: ChatResponseMessage,
}

/// Generated message; `content` is null when the model refused or produced nothing.
#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    /// Generated text.
    pub content: Option<String>,
}

/// Token usage metrics.
#[derive(Debug, Deserialize)]
pub struct ChatUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: u64,
    /// Tokens in the completion.
    pub completion_tokens: u64,
}

impl ChatResponse {
    /// Extracts the structured output from the first choice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResponse`] when the content is not JSON.
    pub fn into_output(self) -> Result<Option<Value>> {
        if let Some(usage) = &self.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat completion usage"
            );
        }
        let content = self
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content);
        match content {
            Some(text) => parse_structured(&text),
            None => Ok(None),
        }
    }
}

/// Parses model text into JSON, tolerating a surrounding Markdown fence.
///
/// Blank text is treated as no output.
///
/// # Errors
///
/// Returns [`Error::InvalidResponse`] when the text is not valid JSON.
pub fn parse_structured(text: &str) -> Result<Option<Value>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let body = strip_code_fence(trimmed);
    from_str(body)
        .map(Some)
        .map_err(|err| Error::InvalidResponse(format!("Reply is not valid JSON: {err}")))
}

/// Language tag models put after an opening fence.
const JSON_TAG: &str = "json";

/// Unwraps a reply the model wrapped in a Markdown code fence.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let after_tag = rest.split_once('\n').map_or_else(|| strip_inline_tag(rest), |(_, body)| body);
    after_tag
        .trim_end()
        .strip_suffix("```")
        .unwrap_or(after_tag)
        .trim()
}

/// Drops a `json` language tag glued to a one-line fence body.
fn strip_inline_tag(rest: &str) -> &str {
    match (rest.get(..JSON_TAG.len()), rest.get(JSON_TAG.len()..)) {
        (Some(tag), Some(body)) if tag.eq_ignore_ascii_case(JSON_TAG) => body,
        _ => rest,
    }
}

/// Sends a chat completion request and decodes the structured output.
///
/// # Errors
///
/// Returns [`Error::Request`] for transport failures, [`Error::Provider`]
/// for error statuses and undecodable envelopes, and [`Error::InvalidResponse`] when the model's
/// message is not JSON.
pub async fn send_chat(
    client: &Client,
    url: &str,
    api_key: &str,
    request: &ChatRequest<'_>,
    provider: &str,
) -> Result<Option<Value>> {
    let response = client
        .post(url)
        .bearer_auth(api_key)
        .json(request)
        .send()
        .await?;

    let response = ensure_success(response, provider).await?;

    let chat_response: ChatResponse = response
        .json()
        .await
        .map_err(|err| Error::Provider(format!("Failed to parse {provider} response: {err}")))?;

    chat_response.into_output()
}

/// Turns an HTTP error status into [`Error::Provider`] with the response body.
///
/// # Errors
///
/// Returns [`Error::Provider`] when the status is not a success.
pub async fn ensure_success(response: HttpResponse, provider: &str) -> Result<HttpResponse> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_owned());
    Err(Error::Provider(format!(
        "{provider} API error {status}: {error_text}"
    )))
}
