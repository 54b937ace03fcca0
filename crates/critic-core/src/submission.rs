//! Explicit lifecycle of one submission.
//!
//! ```text
//! Idle → Validating → Validated → Generating → Succeeded
//!                   ↘ Rejected              ↘ Failed
//! ```
//!
//! `Rejected`, `Succeeded` and `Failed` are terminal; only [`Submission::reset`]
//! leaves them, back to `Idle`. Dropping a [`Submission::run`] future while it
//! waits on the backend leaves the submission `Failed`.

use core::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::generator::FeedbackGenerator;
use crate::service::FeedbackError;
use crate::types::{FeedbackResult, RawFeedbackRequest};
use crate::validate;

/// Where a submission is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum SubmissionState {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// Input is being checked.
    Validating,
    /// Input passed validation.
    Validated,
    /// Input failed validation.
    Rejected,
    /// Waiting on the model backend.
    Generating,
    /// Feedback was produced.
    Succeeded,
    /// Generation failed.
    Failed,
}

impl SubmissionState {
    /// Whether no further transition exists except a reset.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Succeeded | Self::Failed)
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Validating)
                | (Self::Validating, Self::Validated | Self::Rejected)
                | (Self::Validated, Self::Generating)
                | (Self::Generating, Self::Succeeded | Self::Failed)
                | (Self::Rejected | Self::Succeeded | Self::Failed, Self::Idle)
        )
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, formatter)
    }
}

/// Attempted a transition the lifecycle does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[error("cannot move submission from {from} to {to}")]
pub struct InvalidTransition {
    /// State before the attempt.
    pub from: SubmissionState,
    /// Requested state.
    pub to: SubmissionState,
}

/// Drives one request through validation and generation.
///
/// Running requires `&mut self`, so a single instance never has two
/// backend calls in flight.
#[derive(Debug, Default)]
pub struct Submission {
    /// Current lifecycle state.
    state: SubmissionState,
}

impl Submission {
    /// Creates a submission in [`SubmissionState::Idle`].
    pub const fn new() -> Self {
        Self {
            state: SubmissionState::Idle,
        }
    }

    /// Current state.
    pub const fn state(&self) -> SubmissionState {
        self.state
    }

    /// Whether the submit affordance should be locked.
    pub const fn is_pending(&self) -> bool {
        matches!(
            self.state,
            SubmissionState::Validating | SubmissionState::Validated | SubmissionState::Generating
        )
    }

    /// Moves to `next` if the lifecycle allows it.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] and leaves the state unchanged otherwise.
    pub fn transition(&mut self, next: SubmissionState) -> Result<(), InvalidTransition> {
        if !self.state.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// Returns a finished submission to `Idle` for a fresh attempt.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] unless the current state is terminal.
    pub fn reset(&mut self) -> Result<(), InvalidTransition> {
        self.transition(SubmissionState::Idle)
    }

    /// Validates `raw` and, on success, generates feedback for it.
    ///
    /// The submission ends in `Rejected`, `Succeeded` or `Failed`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedbackError::InvalidState`] when not `Idle`, otherwise the
    /// validation or generation failure.
    pub async fn run(
        &mut self,
        raw: &RawFeedbackRequest,
        generator: &FeedbackGenerator,
    ) -> Result<FeedbackResult, FeedbackError> {
        self.transition(SubmissionState::Validating)?;

        let request = match validate(raw) {
            Ok(request) => request,
            Err(error) => {
                self.transition(SubmissionState::Rejected)?;
                info!(field = %error.field, reason = %error.reason, "Submission rejected");
                return Err(error.into());
            }
        };
        self.transition(SubmissionState::Validated)?;

        self.transition(SubmissionState::Generating)?;
        let guard = GenerationGuard { submission: self };
        match generator.generate(&request).await {
            Ok(result) => {
                guard.submission.transition(SubmissionState::Succeeded)?;
                info!(
                    language = %request.programming_language(),
                    rating = result.rating(),
                    "Submission succeeded"
                );
                Ok(result)
            }
            Err(error) => {
                guard.submission.transition(SubmissionState::Failed)?;
                info!(kind = %error.kind, "Submission failed");
                Err(error.into())
            }
        }
    }
}

/// Marks a submission `Failed` if generation is abandoned mid-flight.
struct GenerationGuard<'sub> {
    /// Submission in `Generating`.
    submission: &'sub mut Submission,
}

impl Drop for GenerationGuard<'_> {
    fn drop(&mut self) {
        if self.submission.state == SubmissionState::Generating {
            warn!("Generation cancelled before the backend answered");
            self.submission.state = SubmissionState::Failed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::Value;
    use tokio::time;

    use crate::schema::OutputSchema;
    use crate::{ModelBackend, Result as CoreResult};

    /// Backend that never answers in time.
    struct StalledBackend;

    #[async_trait]
    impl ModelBackend for StalledBackend {
        fn name(&self) -> &'static str {
            "stalled"
        }

        async fn invoke(&self, _prompt: &str, _schema: &OutputSchema) -> CoreResult<Option<Value>> {
            time::sleep(Duration::from_secs(30)).await;
            Ok(None)
        }
    }

    const ALL: [SubmissionState; 7] = [
        SubmissionState::Idle,
        SubmissionState::Validating,
        SubmissionState::Validated,
        SubmissionState::Rejected,
        SubmissionState::Generating,
        SubmissionState::Succeeded,
        SubmissionState::Failed,
    ];

    #[test]
    fn test_happy_path_transitions() {
        let mut submission = Submission::new();
        for next in [
            SubmissionState::Validating,
            SubmissionState::Validated,
            SubmissionState::Generating,
            SubmissionState::Succeeded,
        ] {
            submission.transition(next).unwrap();
        }
        assert!(submission.state().is_terminal());
        submission.reset().unwrap();
        assert_eq!(submission.state(), SubmissionState::Idle);
    }

    #[test]
    fn test_cannot_reenter_generating() {
        let mut submission = Submission::new();
        submission.transition(SubmissionState::Validating).unwrap();
        submission.transition(SubmissionState::Validated).unwrap();
        submission.transition(SubmissionState::Generating).unwrap();
        assert!(submission.is_pending());

        let error = submission.transition(SubmissionState::Generating).unwrap_err();
        assert_eq!(
            error,
            InvalidTransition {
                from: SubmissionState::Generating,
                to: SubmissionState::Generating,
            }
        );
        assert_eq!(submission.state(), SubmissionState::Generating);
    }

    #[test]
    fn test_rejected_never_reaches_generating() {
        let mut submission = Submission::new();
        submission.transition(SubmissionState::Validating).unwrap();
        submission.transition(SubmissionState::Rejected).unwrap();
        submission.transition(SubmissionState::Generating).unwrap_err();
    }

    #[test]
    fn test_reset_only_from_terminal_states() {
        let mut submission = Submission::new();
        submission.reset().unwrap_err();
        submission.transition(SubmissionState::Validating).unwrap();
        submission.reset().unwrap_err();
    }

    #[tokio::test]
    async fn test_cancelled_generation_ends_failed() {
        let generator = FeedbackGenerator::new(Arc::new(StalledBackend));
        let raw = RawFeedbackRequest::new("a".repeat(25), "python", "beginner");
        let mut submission = Submission::new();

        let outcome = time::timeout(Duration::from_millis(20), submission.run(&raw, &generator)).await;
        assert!(outcome.is_err(), "stalled backend should not answer");

        assert_eq!(submission.state(), SubmissionState::Failed);
        assert!(!submission.is_pending());
        submission.reset().unwrap();
        assert_eq!(submission.state(), SubmissionState::Idle);
    }

    #[test]
    fn test_no_self_loops_and_no_retry_edge() {
        for state in ALL {
            assert!(!state.can_transition_to(state), "{state} loops");
        }
        assert!(!SubmissionState::Failed.can_transition_to(SubmissionState::Generating));
        assert!(!SubmissionState::Idle.can_transition_to(SubmissionState::Generating));
    }

    #[test]
    fn test_terminal_states() {
        let terminal: Vec<_> = ALL.into_iter().filter(|state| state.is_terminal()).collect();
        assert_eq!(
            terminal,
            vec![
                SubmissionState::Rejected,
                SubmissionState::Succeeded,
                SubmissionState::Failed
            ]
        );
    }
}
