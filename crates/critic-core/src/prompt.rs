//! Prompt rendering.
//!
//! The instruction block is a pure function of the validated request and the
//! schema variant: the same input always renders byte-identical text.

use crate::schema::{MAX_FEEDBACK_POINTS, SchemaVariant};
use crate::types::FeedbackRequest;

/// Opening paragraph shared by every prompt.
const PREAMBLE: &str = "\
You are an AI code reviewer providing personalized feedback on code submissions.

Your feedback must be friendly, easy to understand, human-like and safe for beginners.
Never use robotic or harsh wording.";

/// Renders the instruction block sent to the model backend.
pub fn render_prompt(request: &FeedbackRequest, variant: SchemaVariant) -> String {
    let language = request.programming_language();
    let level = request.user_skill_level();
    let fence = code_fence(request.code());

    let mut prompt = String::with_capacity(PREAMBLE.len() + request.code().len() + 1024);
    prompt.push_str(PREAMBLE);
    prompt.push_str("\n\n");
    prompt.push_str(&format!(
        "Adapt your tone to the user's skill level. {}\n\n",
        level.tone_guidance()
    ));
    prompt.push_str(&format!("Programming Language: {language}\n"));
    prompt.push_str(&format!("User Skill Level: {level}\n"));
    prompt.push_str(&format!(
        "User Coding Style: {}\n\n",
        request.coding_style_or_empty()
    ));
    prompt.push_str("Code:\n");
    prompt.push_str(&format!("{fence}{language}\n{}\n{fence}\n\n", request.code()));

    prompt.push_str(&format!(
        "Provide 2-{MAX_FEEDBACK_POINTS} feedback points as separate entries of the \"feedback\" list.\n"
    ));
    prompt.push_str(
        "Each point must contain a specific, actionable suggestion for improvement; do not give generic praise.\n",
    );
    prompt.push_str(
        "Give exactly five numeric scores from 1 to 5: an overall \"rating\", plus \"readability\", \"logic\", \"optimization\" and \"maintainability\".\n",
    );
    prompt.push_str("Tailor the feedback to the user's skill level and coding style.\n");
    if variant.includes_explanation() {
        prompt.push_str(
            "Also write \"codeExplanation\": a short, beginner-friendly explanation of what the code does.\n",
        );
    }
    prompt.push_str("Respond only with a JSON object that matches the provided schema.\n");

    prompt
}

/// Backtick fence long enough not to collide with any run inside the code.
fn code_fence(code: &str) -> String {
    let longest_run = code
        .split(|character: char| character != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest_run.max(2) + 1)
}
