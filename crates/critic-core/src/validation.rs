//! Input checks that run before any backend call.

use core::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::types::{FeedbackRequest, ProgrammingLanguage, RawFeedbackRequest, SkillLevel};

/// Minimum number of characters of code, counted after trimming.
pub const MIN_CODE_CHARS: usize = 20;

/// Request field a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// `code`
    Code,
    /// `programmingLanguage`
    ProgrammingLanguage,
    /// `userSkillLevel`
    UserSkillLevel,
}

impl Field {
    /// Wire name of the field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::ProgrammingLanguage => "programmingLanguage",
            Self::UserSkillLevel => "userSkillLevel",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// Fewer than [`MIN_CODE_CHARS`] characters after trimming.
    TooShort,
    /// Empty or not one of the accepted values.
    Missing,
}

impl Reason {
    /// Wire name of the reason.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TooShort => "too_short",
            Self::Missing => "missing",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A field-scoped input problem, raised before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    /// Offending field.
    pub field: Field,
    /// What is wrong with it.
    pub reason: Reason,
}

impl ValidationError {
    /// Creates a validation error.
    pub const fn new(field: Field, reason: Reason) -> Self {
        Self { field, reason }
    }

    /// Message shown under the offending form field.
    pub const fn user_message(&self) -> &'static str {
        match self.field {
            Field::Code => "Please enter at least 20 characters of code.",
            Field::ProgrammingLanguage => "Please select a language.",
            Field::UserSkillLevel => "Please select your skill level.",
        }
    }
}

/// Checks a raw submission and converts it into a [`FeedbackRequest`].
///
/// Fields are checked in form order (code, language, skill level) and the
/// first failure wins. The coding style is passed through untouched.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming the first field that does not pass.
pub fn validate(raw: &RawFeedbackRequest) -> Result<FeedbackRequest, ValidationError> {
    let code = raw.code.trim();
    if code.chars().count() < MIN_CODE_CHARS {
        return Err(ValidationError::new(Field::Code, Reason::TooShort));
    }

    let language = ProgrammingLanguage::from_wire(&raw.programming_language)
        .ok_or(ValidationError::new(Field::ProgrammingLanguage, Reason::Missing))?;

    let skill_level = SkillLevel::from_wire(&raw.user_skill_level)
        .ok_or(ValidationError::new(Field::UserSkillLevel, Reason::Missing))?;

    Ok(FeedbackRequest::from_validated(
        code.to_owned(),
        language,
        skill_level,
        raw.user_coding_style.clone(),
    ))
}
