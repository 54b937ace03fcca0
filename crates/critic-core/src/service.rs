//! Boundary entry point consumed by the presentation layer.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::generator::{FeedbackGenerator, GenerationError, GenerationErrorKind};
use crate::submission::{InvalidTransition, Submission};
use crate::types::{FeedbackResult, RawFeedbackRequest};
use crate::validation::ValidationError;
use crate::{CriticConfig, ModelBackend};

/// Shown when the backend answered with something unusable.
const SCHEMA_VIOLATION_MESSAGE: &str =
    "We were unable to produce a valid evaluation of your code. Please try again.";
/// Shown for any transient backend failure.
const BACKEND_UNAVAILABLE_MESSAGE: &str =
    "An error occurred while evaluating your code. Please try again.";
/// Shown when a submission is driven out of order.
const IN_PROGRESS_MESSAGE: &str = "An evaluation is already in progress. Please wait for it to finish.";

/// Any failure of a submission, as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FeedbackError {
    /// Input was rejected before any backend call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The generator failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The submission was not in a state that allows this step.
    #[error(transparent)]
    InvalidState(#[from] InvalidTransition),
}

impl FeedbackError {
    /// The single human-readable message the UI shows for this failure.
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(error) => error.user_message(),
            Self::Generation(error) => match error.kind {
                GenerationErrorKind::SchemaViolation => SCHEMA_VIOLATION_MESSAGE,
                GenerationErrorKind::BackendUnavailable => BACKEND_UNAVAILABLE_MESSAGE,
            },
            Self::InvalidState(_) => IN_PROGRESS_MESSAGE,
        }
    }

    /// Whether resubmitting identical input may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Generation(error) if error.is_retryable())
    }
}

/// Validates raw submissions and generates feedback for them.
///
/// Holds no per-request state; clone it freely or share it between tasks.
#[derive(Debug, Clone)]
pub struct FeedbackService {
    /// Generator shared by every submission.
    generator: FeedbackGenerator,
}

impl FeedbackService {
    /// Creates a service around an already configured generator.
    pub const fn new(generator: FeedbackGenerator) -> Self {
        Self { generator }
    }

    /// Creates a service for `backend` using the generation settings of `config`.
    pub fn from_config(backend: Arc<dyn ModelBackend>, config: &CriticConfig) -> Self {
        Self::new(
            FeedbackGenerator::new(backend)
                .with_timeout(config.generation.timeout())
                .with_variant(config.generation.variant()),
        )
    }

    /// The underlying generator.
    pub const fn generator(&self) -> &FeedbackGenerator {
        &self.generator
    }

    /// Runs one submission from validation to a typed result.
    ///
    /// # Errors
    ///
    /// Returns [`FeedbackError::Validation`] before any network call when the
    /// input is rejected, and [`FeedbackError::Generation`] when the backend
    /// fails or returns a non-conformant result.
    pub async fn get_feedback(&self, raw: &RawFeedbackRequest) -> Result<FeedbackResult, FeedbackError> {
        Submission::new().run(raw, &self.generator).await
    }
}

/// One-shot entry point using default generator settings.
///
/// # Errors
///
/// See [`FeedbackService::get_feedback`].
pub async fn get_feedback(
    backend: Arc<dyn ModelBackend>,
    raw: &RawFeedbackRequest,
) -> Result<FeedbackResult, FeedbackError> {
    FeedbackService::new(FeedbackGenerator::new(backend))
        .get_feedback(raw)
        .await
}
