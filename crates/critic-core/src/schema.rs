//! Declared output contract sent to the model backend alongside the prompt.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Lowest accepted score.
pub const SCORE_MIN: f64 = 1.0;
/// Highest accepted score.
pub const SCORE_MAX: f64 = 5.0;
/// Most feedback points a result may carry.
pub const MAX_FEEDBACK_POINTS: usize = 3;

/// Names of the five numeric fields, overall rating first.
pub const SCORE_FIELDS: [&str; 5] = [
    "rating",
    "readability",
    "logic",
    "optimization",
    "maintainability",
];
/// Name of the feedback points field.
pub const FEEDBACK_FIELD: &str = "feedback";
/// Name of the explanation field of the extended variant.
pub const EXPLANATION_FIELD: &str = "codeExplanation";

/// Which shape of result is requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVariant {
    /// Feedback points plus five scores.
    #[default]
    Standard,
    /// Standard fields plus a beginner-oriented explanation of the code.
    Extended,
}

impl SchemaVariant {
    /// Whether `codeExplanation` is part of the contract.
    pub const fn includes_explanation(self) -> bool {
        matches!(self, Self::Extended)
    }
}

/// JSON Schema describing the result the backend must produce.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    /// Variant the schema was built for.
    variant: SchemaVariant,
    /// Rendered JSON Schema document.
    document: Value,
}

impl OutputSchema {
    /// Builds the schema for a variant.
    pub fn new(variant: SchemaVariant) -> Self {
        let mut properties = Map::new();
        properties.insert(
            FEEDBACK_FIELD.to_owned(),
            json!({
                "type": "array",
                "description": "Personalized feedback as 2-3 short points, each with a concrete suggestion.",
                "items": { "type": "string" },
                "minItems": 1,
                "maxItems": MAX_FEEDBACK_POINTS,
            }),
        );
        for (field, description) in SCORE_FIELDS.iter().zip(score_descriptions()) {
            properties.insert(
                (*field).to_owned(),
                json!({
                    "type": "number",
                    "description": description,
                    "minimum": SCORE_MIN,
                    "maximum": SCORE_MAX,
                }),
            );
        }
        if variant.includes_explanation() {
            properties.insert(
                EXPLANATION_FIELD.to_owned(),
                json!({
                    "type": "string",
                    "description": "A beginner-friendly explanation of what the code does.",
                }),
            );
        }

        let document = json!({
            "type": "object",
            "properties": properties,
            "required": Self::required_fields_for(variant),
            "additionalProperties": false,
        });

        Self { variant, document }
    }

    /// Variant this schema describes.
    pub const fn variant(&self) -> SchemaVariant {
        self.variant
    }

    /// Identifier for backends that want a named schema.
    pub const fn name(&self) -> &'static str {
        match self.variant {
            SchemaVariant::Standard => "code_feedback",
            SchemaVariant::Extended => "code_feedback_with_explanation",
        }
    }

    /// The JSON Schema document.
    pub const fn as_json(&self) -> &Value {
        &self.document
    }

    /// Every field the backend must return.
    pub fn required_fields(&self) -> Vec<&'static str> {
        Self::required_fields_for(self.variant)
    }

    fn required_fields_for(variant: SchemaVariant) -> Vec<&'static str> {
        let mut fields = Vec::with_capacity(SCORE_FIELDS.len() + 2);
        fields.push(FEEDBACK_FIELD);
        fields.extend(SCORE_FIELDS);
        if variant.includes_explanation() {
            fields.push(EXPLANATION_FIELD);
        }
        fields
    }
}

impl Default for OutputSchema {
    fn default() -> Self {
        Self::new(SchemaVariant::default())
    }
}

/// Descriptions in the same order as [`SCORE_FIELDS`].
const fn score_descriptions() -> [&'static str; 5] {
    [
        "Overall rating of the code submission (1-5).",
        "Rating for readability (1-5).",
        "Rating for logic (1-5).",
        "Rating for optimization (1-5).",
        "Rating for maintainability (1-5).",
    ]
}
