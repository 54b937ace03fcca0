//! Masks credentials in backend diagnostics before they leave the core.

use std::sync::LazyLock;

use regex::Regex;

/// Replacement for any detected secret.
pub const REDACTED: &str = "[REDACTED]";

/// Bearer tokens and well-known API key shapes.
static SECRET_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)\b(bearer\s+)[^\s,;]+", "${1}[REDACTED]"),
        (r"\b(?:sk-or-v1-|sk-ant-|sk-|gsk_)[A-Za-z0-9_\-]{8,}", REDACTED),
        (
            r#"(?i)\b(api[_-]?key["']?\s*[:=]\s*["']?)[^\s"',}]+"#,
            "${1}[REDACTED]",
        ),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| {
        Regex::new(pattern).ok().map(|regex| (regex, replacement))
    })
    .collect()
});

/// Returns `text` with bearer tokens and API keys masked.
pub fn redact_secrets(text: &str) -> String {
    SECRET_PATTERNS
        .iter()
        .fold(text.to_owned(), |masked, (regex, replacement)| {
            regex.replace_all(&masked, *replacement).into_owned()
        })
}
