//! Rendering of results for the terminal.

use critic_core::FeedbackResult;

/// Width of the score label column.
const LABEL_WIDTH: usize = 18;

/// Human-readable label for a score field.
fn score_label(field: &str) -> &str {
    match field {
        "rating" => "Overall rating",
        "readability" => "Readability",
        "logic" => "Logic",
        "optimization" => "Optimization",
        "maintainability" => "Maintainability",
        other => other,
    }
}

/// Five-step bar for a score in 1..=5.
fn score_bar(score: f64) -> String {
    let filled = score.round().clamp(0.0, 5.0) as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(5 - filled))
}

/// Renders `result` as a plain-text report.
pub fn render_report(result: &FeedbackResult) -> String {
    let mut out = String::from("Feedback\n");
    for (index, point) in result.feedback().iter().enumerate() {
        out.push_str(&format!("  {}. {point}\n", index + 1));
    }

    out.push_str("\nScores\n");
    for (field, score) in result.scores().named() {
        out.push_str(&format!(
            "  {label:<LABEL_WIDTH$} {bar} {score:.1} / 5\n",
            label = score_label(field),
            bar = score_bar(score),
        ));
    }

    if let Some(explanation) = result.code_explanation() {
        out.push_str("\nWhat this code does\n");
        for line in explanation.lines() {
            out.push_str(&format!("  {line}\n"));
        }
    }
    out
}

/// Renders `result` as pretty-printed JSON.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn render_json(result: &FeedbackResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

/// Writes `text` to stdout.
#[allow(clippy::print_stdout, reason = "CLI output")]
pub fn emit(text: &str) {
    println!("{text}");
}

/// Writes `text` to stderr.
#[allow(clippy::print_stderr, reason = "CLI error output")]
pub fn emit_error(text: &str) {
    eprintln!("{text}");
}
