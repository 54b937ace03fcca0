//! Runtime check of backend output against the declared [`OutputSchema`].
//!
//! The model's reply cannot be trusted statically, so every field is verified
//! here before a [`FeedbackResult`] exists. Nothing is defaulted or clamped:
//! any gap is a [`SchemaViolation`].
//!
//! [`OutputSchema`]: crate::OutputSchema

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::schema::{
    EXPLANATION_FIELD, FEEDBACK_FIELD, MAX_FEEDBACK_POINTS, SCORE_FIELDS, SCORE_MAX, SCORE_MIN,
    SchemaVariant,
};
use crate::types::{FeedbackResult, ScoreCard};

/// Ways in which backend output can miss the contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaViolation {
    /// The backend produced nothing.
    #[error("backend returned no output")]
    NoOutput,

    /// The top-level value is not a JSON object.
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// A required field is absent or null.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A field has the wrong primitive type.
    #[error("field `{field}` should be {expected}, got {actual}")]
    WrongType {
        /// Field name.
        field: &'static str,
        /// Expected JSON type.
        expected: &'static str,
        /// Actual JSON type.
        actual: &'static str,
    },

    /// A score lies outside `[1, 5]`.
    #[error("field `{field}` is {value}, outside {SCORE_MIN}..={SCORE_MAX}")]
    OutOfRange {
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: f64,
    },

    /// No usable feedback point was returned.
    #[error("feedback contains no points")]
    EmptyFeedback,

    /// The extended variant's explanation is blank.
    #[error("codeExplanation is empty")]
    EmptyExplanation,

    /// More feedback points than the schema allows.
    #[error("feedback has {0} points, at most {MAX_FEEDBACK_POINTS} allowed")]
    TooManyPoints(usize),
}

/// Verifies backend output and converts it into a [`FeedbackResult`].
///
/// Fields beyond the contract are ignored. For the standard variant a stray
/// `codeExplanation` is dropped rather than surfaced.
///
/// # Errors
///
/// Returns the first [`SchemaViolation`] found.
pub fn check(output: Option<Value>, variant: SchemaVariant) -> Result<FeedbackResult, SchemaViolation> {
    let value = output.ok_or(SchemaViolation::NoOutput)?;
    let object = match value {
        Value::Object(object) => object,
        other => return Err(SchemaViolation::NotAnObject(type_name(&other))),
    };

    let feedback = feedback_points(&object)?;
    let [rating, readability, logic, optimization, maintainability] =
        SCORE_FIELDS.map(|field| score(&object, field));
    let scores = ScoreCard {
        rating: rating?,
        readability: readability?,
        logic: logic?,
        optimization: optimization?,
        maintainability: maintainability?,
    };

    let code_explanation = if variant.includes_explanation() {
        let explanation = required_string(&object, EXPLANATION_FIELD)?;
        if explanation.is_empty() {
            return Err(SchemaViolation::EmptyExplanation);
        }
        Some(explanation)
    } else {
        None
    };

    let extra = object
        .keys()
        .filter(|key| !is_contract_field(key, variant))
        .count();
    if extra > 0 {
        debug!("Ignoring {extra} field(s) outside the output schema");
    }

    Ok(FeedbackResult::from_checked(feedback, scores, code_explanation))
}

/// Splits bullet-delimited prose into individual points.
///
/// Lines starting with `-`, `*`, `•` or `1.`/`1)` open a new point, as does
/// an inline ` • ` separator; other non-empty lines continue the previous
/// point. Text without any marker becomes a single point.
pub fn split_bullets(text: &str) -> Vec<String> {
    let mut points: Vec<String> = Vec::new();
    for line in text.lines() {
        let mut segments = line.split(" • ");
        if let Some(first) = segments.next() {
            let trimmed = first.trim();
            if !trimmed.is_empty() {
                match strip_marker(trimmed) {
                    Some(body) => points.push(body.to_owned()),
                    None => match points.last_mut() {
                        Some(previous) => {
                            previous.push(' ');
                            previous.push_str(trimmed);
                        }
                        None => points.push(trimmed.to_owned()),
                    },
                }
            }
        }
        points.extend(segments.map(|segment| segment.trim().to_owned()));
    }
    points.retain(|point| !point.is_empty());
    points
}

fn strip_marker(line: &str) -> Option<&str> {
    for marker in ["- ", "* ", "•"] {
        if let Some(body) = line.strip_prefix(marker) {
            return Some(body.trim_start());
        }
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(body) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return Some(body.trim_start());
        }
    }
    None
}

fn feedback_points(object: &Map<String, Value>) -> Result<Vec<String>, SchemaViolation> {
    let points = match present(object, FEEDBACK_FIELD)? {
        Value::Array(items) => {
            let mut points = Vec::with_capacity(items.len());
            for item in items {
                let Value::String(text) = item else {
                    return Err(SchemaViolation::WrongType {
                        field: FEEDBACK_FIELD,
                        expected: "an array of strings",
                        actual: type_name(item),
                    });
                };
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    points.push(trimmed.to_owned());
                }
            }
            points
        }
        Value::String(text) => split_bullets(text),
        other => {
            return Err(SchemaViolation::WrongType {
                field: FEEDBACK_FIELD,
                expected: "an array of strings",
                actual: type_name(other),
            });
        }
    };

    if points.is_empty() {
        return Err(SchemaViolation::EmptyFeedback);
    }
    if points.len() > MAX_FEEDBACK_POINTS {
        return Err(SchemaViolation::TooManyPoints(points.len()));
    }
    Ok(points)
}

fn score(object: &Map<String, Value>, field: &'static str) -> Result<f64, SchemaViolation> {
    let value = present(object, field)?;
    let number = value.as_f64().ok_or_else(|| SchemaViolation::WrongType {
        field,
        expected: "a number",
        actual: type_name(value),
    })?;
    if !(SCORE_MIN..=SCORE_MAX).contains(&number) {
        return Err(SchemaViolation::OutOfRange {
            field,
            value: number,
        });
    }
    Ok(number)
}

fn required_string(object: &Map<String, Value>, field: &'static str) -> Result<String, SchemaViolation> {
    match present(object, field)? {
        Value::String(text) => Ok(text.trim().to_owned()),
        other => Err(SchemaViolation::WrongType {
            field,
            expected: "a string",
            actual: type_name(other),
        }),
    }
}

fn present<'obj>(
    object: &'obj Map<String, Value>,
    field: &'static str,
) -> Result<&'obj Value, SchemaViolation> {
    match object.get(field) {
        None | Some(Value::Null) => Err(SchemaViolation::MissingField(field)),
        Some(value) => Ok(value),
    }
}

fn is_contract_field(key: &str, variant: SchemaVariant) -> bool {
    key == FEEDBACK_FIELD
        || SCORE_FIELDS.contains(&key)
        || (variant.includes_explanation() && key == EXPLANATION_FIELD)
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
