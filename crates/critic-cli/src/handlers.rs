//! Command handlers for CLI operations

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use critic_core::{CriticConfig, FeedbackError, FeedbackService, RawFeedbackRequest, validate};
use critic_providers::create_backend;
use tokio::fs as async_fs;
use tokio::io::{AsyncReadExt as _, stdin};
use tracing::{debug, warn};

use crate::cli::ReviewArgs;
use crate::report::{emit, emit_error, render_json, render_report};

/// Exit status for input rejected before generation.
const EXIT_INVALID_INPUT: u8 = 2;
/// Placeholder shown instead of a configured API key.
const MASKED_KEY: &str = "********";

/// Handle `critic review`
///
/// # Errors
/// Returns an error if the input or config cannot be read, or the backend
/// cannot be constructed.
pub async fn handle_review(args: ReviewArgs, config_path: Option<&Path>) -> Result<ExitCode> {
    let code = read_code(&args).await?;

    let mut raw = RawFeedbackRequest::new(code, args.language, args.skill);
    if let Some(style) = args.style {
        raw = raw.with_coding_style(style);
    }

    // Rejected input never needs a backend or an API key.
    if let Err(error) = validate(&raw) {
        return Ok(report_failure(&FeedbackError::Validation(error)));
    }

    let mut config = load_config(config_path)?;
    if let Some(provider) = args.provider {
        config.backend.provider = provider;
    }
    if let Some(model) = args.model {
        config.backend.model = Some(model);
    }
    if args.explain {
        config.generation.explain_code = true;
    }

    let backend = create_backend(&config)?;
    let service = FeedbackService::from_config(backend, &config);

    match service.get_feedback(&raw).await {
        Ok(result) => {
            let rendered = if args.json {
                render_json(&result)?
            } else {
                render_report(&result)
            };
            emit(&rendered);
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => Ok(report_failure(&error)),
    }
}

/// Output the config file location, or the effective configuration with
/// API keys masked.
///
/// # Errors
/// Returns an error if the config cannot be loaded or serialized.
pub fn handle_config(path_only: bool, config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(custom) => custom.to_path_buf(),
        None => CriticConfig::config_path()?,
    };

    if path_only {
        emit(&path.display().to_string());
        return Ok(());
    }

    let mut config = CriticConfig::load_or_create_at(&path)?;
    for key in [
        &mut config.api_keys.openrouter_api_key,
        &mut config.api_keys.groq_api_key,
    ] {
        if key.is_some() {
            *key = Some(MASKED_KEY.to_owned());
        }
    }

    emit(&format!("# {}", path.display()));
    emit(&toml::to_string_pretty(&config)?);
    Ok(())
}

/// Reads the snippet from the named file or stdin.
async fn read_code(args: &ReviewArgs) -> Result<String> {
    if args.reads_stdin() {
        let mut code = String::new();
        stdin()
            .read_to_string(&mut code)
            .await
            .context("Failed to read code from stdin")?;
        return Ok(code);
    }
    async_fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("Failed to read {}", args.input.display()))
}

/// Loads `path`, or the default config file, creating it on first run.
fn load_config(path: Option<&Path>) -> Result<CriticConfig> {
    let config = match path {
        Some(custom) => CriticConfig::load_or_create_at(custom)?,
        None => CriticConfig::load_or_create()?,
    };
    debug!(provider = %config.backend.provider, "Configuration loaded");
    Ok(config)
}

/// Prints the single user-facing message and picks the exit status.
fn report_failure(error: &FeedbackError) -> ExitCode {
    warn!(error = %error, retryable = error.is_retryable(), "Review failed");
    emit_error(error.user_message());
    match error {
        FeedbackError::Validation(_) => ExitCode::from(EXIT_INVALID_INPUT),
        FeedbackError::Generation(_) | FeedbackError::InvalidState(_) => ExitCode::FAILURE,
    }
}
