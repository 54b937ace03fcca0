//! Prompt → backend → conformance pipeline for a single validated request.

use core::fmt;
use core::time::Duration;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tokio::time;
use tracing::{debug, warn};

use crate::conformance::{self, SchemaViolation};
use crate::prompt::render_prompt;
use crate::redact::redact_secrets;
use crate::schema::{OutputSchema, SchemaVariant};
use crate::types::{FeedbackRequest, FeedbackResult};
use crate::{Error, ModelBackend};

/// Default ceiling on a single backend invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Category of a generation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GenerationErrorKind {
    /// The backend answered, but not with a conformant result.
    SchemaViolation,
    /// The backend could not be reached, refused the request, or timed out.
    BackendUnavailable,
}

impl fmt::Display for GenerationErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::SchemaViolation => "schema violation",
            Self::BackendUnavailable => "backend unavailable",
        })
    }
}

/// Failure of the feedback generator, with a secret-free diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind}: {message}")]
pub struct GenerationError {
    /// What went wrong.
    pub kind: GenerationErrorKind,
    /// Diagnostic context from the backend or the conformance check.
    pub message: String,
}

impl GenerationError {
    /// Output did not match the declared schema.
    pub fn schema_violation(message: impl Into<String>) -> Self {
        Self {
            kind: GenerationErrorKind::SchemaViolation,
            message: message.into(),
        }
    }

    /// The backend call failed. Secrets in `message` are masked.
    pub fn backend_unavailable(message: &str) -> Self {
        Self {
            kind: GenerationErrorKind::BackendUnavailable,
            message: redact_secrets(message),
        }
    }

    /// Whether resubmitting the same input may succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind == GenerationErrorKind::BackendUnavailable
    }
}

impl From<SchemaViolation> for GenerationError {
    fn from(violation: SchemaViolation) -> Self {
        Self::schema_violation(violation.to_string())
    }
}

impl From<Error> for GenerationError {
    fn from(error: Error) -> Self {
        if error.is_malformed_output() {
            Self::schema_violation(redact_secrets(&error.to_string()))
        } else {
            Self::backend_unavailable(&error.to_string())
        }
    }
}

/// Turns validated requests into feedback through one model backend.
///
/// Stateless between calls: each [`generate`](Self::generate) performs exactly
/// one backend invocation and never retries.
#[derive(Clone)]
pub struct FeedbackGenerator {
    /// Backend every request is sent to.
    backend: Arc<dyn ModelBackend>,
    /// Output contract, built once per generator.
    schema: OutputSchema,
    /// Wall-clock ceiling per invocation.
    timeout: Duration,
}

impl FeedbackGenerator {
    /// Creates a generator for the standard schema with [`DEFAULT_TIMEOUT`].
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self {
            backend,
            schema: OutputSchema::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the invocation timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Selects the result shape requested from the backend.
    #[must_use]
    pub fn with_variant(mut self, variant: SchemaVariant) -> Self {
        self.schema = OutputSchema::new(variant);
        self
    }

    /// The declared output schema.
    pub const fn schema(&self) -> &OutputSchema {
        &self.schema
    }

    /// The invocation timeout.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Renders the prompt this generator would send for `request`.
    pub fn prompt_for(&self, request: &FeedbackRequest) -> String {
        render_prompt(request, self.schema.variant())
    }

    /// Generates feedback for a validated request.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationErrorKind::BackendUnavailable`] when the backend
    /// fails or exceeds the timeout, and
    /// [`GenerationErrorKind::SchemaViolation`] when it answers with nothing
    /// or with output that does not match the schema.
    pub async fn generate(&self, request: &FeedbackRequest) -> Result<FeedbackResult, GenerationError> {
        let prompt = self.prompt_for(request);
        debug!(
            backend = self.backend.name(),
            prompt_chars = prompt.len(),
            schema = self.schema.name(),
            "Invoking model backend"
        );

        let start = Instant::now();
        let invocation = time::timeout(self.timeout, self.backend.invoke(&prompt, &self.schema)).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let output = match invocation {
            Ok(Ok(output)) => output,
            Ok(Err(error)) => {
                let generation_error = GenerationError::from(error);
                warn!(
                    backend = self.backend.name(),
                    latency_ms,
                    "Backend invocation failed: {generation_error}"
                );
                return Err(generation_error);
            }
            Err(_elapsed) => {
                let timeout_ms = self.timeout.as_millis() as u64;
                warn!(backend = self.backend.name(), timeout_ms, "Backend invocation timed out");
                return Err(GenerationError::backend_unavailable(
                    &Error::Timeout(timeout_ms).to_string(),
                ));
            }
        };

        debug!(backend = self.backend.name(), latency_ms, "Backend answered");
        conformance::check(output, self.schema.variant()).map_err(|violation| {
            warn!(backend = self.backend.name(), "Non-conformant output: {violation}");
            GenerationError::from(violation)
        })
    }
}

impl fmt::Debug for FeedbackGenerator {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("FeedbackGenerator")
            .field("backend", &self.backend.name())
            .field("schema", &self.schema.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}
