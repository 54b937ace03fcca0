//! Model backends for the feedback service.
//!
//! Hosted backends speak the OpenAI-compatible chat completions protocol with
//! a `json_schema` response format; the local backend passes the schema as
//! Ollama's `format`.
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::missing_panics_doc,
        reason = "Allow for tests"
    )
)]

/// Shared chat completions wire types.
pub mod chat;
/// Backend selection from configuration.
pub mod factory;
/// Groq backend implementation.
pub mod groq;
/// Scripted backend for tests.
pub mod mock;
/// Local Ollama backend implementation.
pub mod ollama;
/// `OpenRouter` backend implementation.
pub mod openrouter;

pub use factory::create_backend;
pub use groq::GroqBackend;
pub use mock::{MockBackend, MockReply, sample_output};
pub use ollama::OllamaBackend;
pub use openrouter::OpenRouterBackend;
