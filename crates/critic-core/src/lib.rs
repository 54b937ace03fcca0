//! Core of the code feedback service.
//!
//! A raw submission is validated into a [`FeedbackRequest`], rendered into a
//! deterministic prompt, sent to a [`ModelBackend`] together with the declared
//! [`OutputSchema`], and the reply is checked into a [`FeedbackResult`].
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::missing_panics_doc,
        reason = "Allow for tests"
    )
)]

/// Configuration loading and defaults.
pub mod config;
/// Runtime check of backend output.
pub mod conformance;
/// Error types and result definitions.
pub mod error;
/// Prompt construction and backend invocation.
pub mod generator;
/// Prompt rendering.
pub mod prompt;
/// Secret masking for diagnostics.
pub mod redact;
/// Declared output contract.
pub mod schema;
/// Boundary entry point.
pub mod service;
/// Submission lifecycle.
pub mod submission;
/// Poison-tolerant locking.
pub mod sync;
/// Trait definitions for model backends.
pub mod traits;
/// Request and result types.
pub mod types;
/// Input validation.
pub mod validation;

pub use config::{ApiKeys, BackendConfig, CriticConfig, GenerationConfig, ProviderKind};
pub use conformance::SchemaViolation;
pub use error::{Error, Result};
pub use generator::{DEFAULT_TIMEOUT, FeedbackGenerator, GenerationError, GenerationErrorKind};
pub use prompt::render_prompt;
pub use schema::{OutputSchema, SchemaVariant};
pub use service::{FeedbackError, FeedbackService, get_feedback};
pub use submission::{InvalidTransition, Submission, SubmissionState};
pub use sync::IgnoreLock;
pub use traits::ModelBackend;
pub use types::{
    FeedbackRequest, FeedbackResult, ProgrammingLanguage, RawFeedbackRequest, ScoreCard,
    SkillLevel,
};
pub use validation::{Field, Reason, ValidationError, validate};
