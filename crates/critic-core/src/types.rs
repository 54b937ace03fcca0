//! Request and result types exchanged with the presentation layer.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Submission exactly as it arrives from the form, before validation.
///
/// Missing string fields decode as empty strings so that the validator
/// (not the JSON decoder) is the one to report them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFeedbackRequest {
    /// Code snippet pasted by the user.
    #[serde(default)]
    pub code: String,
    /// Wire identifier of the language, e.g. `"python"`.
    #[serde(default)]
    pub programming_language: String,
    /// Wire identifier of the skill level, e.g. `"beginner"`.
    #[serde(default)]
    pub user_skill_level: String,
    /// Free-form coding style description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_coding_style: Option<String>,
}

impl RawFeedbackRequest {
    /// Creates a raw request without a coding style.
    pub fn new(
        code: impl Into<String>,
        programming_language: impl Into<String>,
        user_skill_level: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            programming_language: programming_language.into(),
            user_skill_level: user_skill_level.into(),
            user_coding_style: None,
        }
    }

    /// Sets the optional coding style.
    #[must_use]
    pub fn with_coding_style(mut self, style: impl Into<String>) -> Self {
        self.user_coding_style = Some(style.into());
        self
    }
}

/// Languages the feedback form offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgrammingLanguage {
    /// `javascript`
    JavaScript,
    /// `python`
    Python,
    /// `java`
    Java,
    /// `csharp`
    CSharp,
    /// `typescript`
    TypeScript,
    /// `go`
    Go,
}

impl ProgrammingLanguage {
    /// Every supported language, in the order the form lists them.
    pub const ALL: [Self; 6] = [
        Self::JavaScript,
        Self::Python,
        Self::Java,
        Self::CSharp,
        Self::TypeScript,
        Self::Go,
    ];

    /// Wire identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::Java => "java",
            Self::CSharp => "csharp",
            Self::TypeScript => "typescript",
            Self::Go => "go",
        }
    }

    /// Human-readable name shown next to the select box.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::JavaScript => "JavaScript",
            Self::Python => "Python",
            Self::Java => "Java",
            Self::CSharp => "C#",
            Self::TypeScript => "TypeScript",
            Self::Go => "Go",
        }
    }

    /// Parses a wire identifier, ignoring case and surrounding whitespace.
    pub fn from_wire(raw: &str) -> Option<Self> {
        let wanted = raw.trim();
        Self::ALL
            .into_iter()
            .find(|language| language.as_str().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for ProgrammingLanguage {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Self-reported experience of the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    /// `beginner`
    Beginner,
    /// `intermediate`
    Intermediate,
    /// `advanced`
    Advanced,
}

impl SkillLevel {
    /// Every supported level, least experienced first.
    pub const ALL: [Self; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    /// Wire identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// Tone instruction matched to this audience.
    pub const fn tone_guidance(self) -> &'static str {
        match self {
            Self::Beginner => {
                "Be encouraging and patient. Explain any technical term you use and avoid jargon."
            }
            Self::Intermediate => {
                "Be supportive and direct. Point out idioms and patterns they may not know yet."
            }
            Self::Advanced => {
                "Be concise and precise. Focus on design trade-offs, edge cases and performance."
            }
        }
    }

    /// Parses a wire identifier, ignoring case and surrounding whitespace.
    pub fn from_wire(raw: &str) -> Option<Self> {
        let wanted = raw.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A submission that passed validation.
///
/// Only [`validate`](crate::validate) can build one, so holding a value of this
/// type proves every required field was checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    /// Trimmed code body.
    code: String,
    /// Parsed language.
    programming_language: ProgrammingLanguage,
    /// Parsed skill level.
    user_skill_level: SkillLevel,
    /// Coding style, untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    user_coding_style: Option<String>,
}

impl FeedbackRequest {
    /// Assembles a request from already-checked parts.
    pub(crate) const fn from_validated(
        code: String,
        programming_language: ProgrammingLanguage,
        user_skill_level: SkillLevel,
        user_coding_style: Option<String>,
    ) -> Self {
        Self {
            code,
            programming_language,
            user_skill_level,
            user_coding_style,
        }
    }

    /// Trimmed code body.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Target language.
    pub const fn programming_language(&self) -> ProgrammingLanguage {
        self.programming_language
    }

    /// Submitter's skill level.
    pub const fn user_skill_level(&self) -> SkillLevel {
        self.user_skill_level
    }

    /// Coding style as submitted, if any.
    pub fn user_coding_style(&self) -> Option<&str> {
        self.user_coding_style.as_deref()
    }

    /// Coding style with absence rendered as an empty string.
    pub fn coding_style_or_empty(&self) -> &str {
        self.user_coding_style.as_deref().unwrap_or_default()
    }
}

/// The five numeric scores of an evaluation, each in `[1, 5]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreCard {
    /// Overall rating.
    pub rating: f64,
    /// How easy the code is to read.
    pub readability: f64,
    /// Correctness of the logic.
    pub logic: f64,
    /// Efficiency of the approach.
    pub optimization: f64,
    /// How easy the code is to change.
    pub maintainability: f64,
}

impl ScoreCard {
    /// Scores paired with their field names, overall rating first.
    pub const fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("rating", self.rating),
            ("readability", self.readability),
            ("logic", self.logic),
            ("optimization", self.optimization),
            ("maintainability", self.maintainability),
        ]
    }

    /// Mean of the four sub-scores (everything except the overall rating).
    pub fn average_sub_score(&self) -> f64 {
        (self.readability + self.logic + self.optimization + self.maintainability) / 4.0
    }
}

/// A complete, schema-conformant evaluation.
///
/// Built only by the conformance check, so every score is present, finite and
/// in range, and the feedback list is never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResult {
    /// Feedback points, one suggestion each.
    feedback: Vec<String>,
    /// Numeric scores, serialized flat next to `feedback`.
    #[serde(flatten)]
    scores: ScoreCard,
    /// Plain-language walkthrough of the code (extended variant).
    #[serde(skip_serializing_if = "Option::is_none")]
    code_explanation: Option<String>,
}

impl FeedbackResult {
    /// Assembles a result from checked parts.
    pub(crate) const fn from_checked(
        feedback: Vec<String>,
        scores: ScoreCard,
        code_explanation: Option<String>,
    ) -> Self {
        Self {
            feedback,
            scores,
            code_explanation,
        }
    }

    /// Feedback points.
    pub fn feedback(&self) -> &[String] {
        &self.feedback
    }

    /// All five scores.
    pub const fn scores(&self) -> &ScoreCard {
        &self.scores
    }

    /// Overall rating.
    pub const fn rating(&self) -> f64 {
        self.scores.rating
    }

    /// Explanation of what the code does, when the extended variant was requested.
    pub fn code_explanation(&self) -> Option<&str> {
        self.code_explanation.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{from_str, json, to_value};

    #[test]
    fn test_language_parsing_is_case_insensitive() {
        assert_eq!(
            ProgrammingLanguage::from_wire(" Python "),
            Some(ProgrammingLanguage::Python)
        );
        assert_eq!(
            ProgrammingLanguage::from_wire("CSHARP"),
            Some(ProgrammingLanguage::CSharp)
        );
        assert_eq!(ProgrammingLanguage::from_wire("rust"), None);
        assert_eq!(ProgrammingLanguage::from_wire(""), None);
    }

    #[test]
    fn test_skill_level_parsing() {
        assert_eq!(SkillLevel::from_wire("advanced"), Some(SkillLevel::Advanced));
        assert_eq!(SkillLevel::from_wire("expert"), None);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(ProgrammingLanguage::CSharp.display_name(), "C#");
        assert_eq!(ProgrammingLanguage::Go.to_string(), "go");
        assert_eq!(SkillLevel::Intermediate.to_string(), "intermediate");
    }

    #[test]
    fn test_raw_request_decodes_camel_case_with_missing_fields() {
        let raw: RawFeedbackRequest =
            from_str(r#"{"code":"print(1)","userCodingStyle":"concise"}"#).unwrap();
        assert_eq!(raw.code, "print(1)");
        assert!(raw.programming_language.is_empty());
        assert!(raw.user_skill_level.is_empty());
        assert_eq!(raw.user_coding_style.as_deref(), Some("concise"));
    }

    #[test]
    fn test_result_serializes_flat() {
        let result = FeedbackResult::from_checked(
            vec!["Name the loop variable.".to_owned()],
            ScoreCard {
                rating: 4.0,
                readability: 4.0,
                logic: 3.0,
                optimization: 3.0,
                maintainability: 5.0,
            },
            None,
        );

        let value = to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "feedback": ["Name the loop variable."],
                "rating": 4.0,
                "readability": 4.0,
                "logic": 3.0,
                "optimization": 3.0,
                "maintainability": 5.0,
            })
        );
    }

    #[test]
    fn test_score_card_helpers() {
        let scores = ScoreCard {
            rating: 5.0,
            readability: 4.0,
            logic: 2.0,
            optimization: 3.0,
            maintainability: 3.0,
        };
        assert!((scores.average_sub_score() - 3.0).abs() < f64::EPSILON);
        assert_eq!(scores.named()[0].0, "rating");
        assert_eq!(scores.named()[4].0, "maintainability");
    }
}
