//! Critic CLI - friendly, scored feedback on code snippets
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        reason = "Allow for tests"
    )
)]

use std::io::stderr;
use std::process::ExitCode;

use clap::Parser as _;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

use cli::{Cli, Commands};
use report::emit_error;

mod cli;
mod handlers;
mod report;

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "critic_core=info,critic_providers=info,critic_cli=info";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(fmt::layer().with_writer(stderr).with_target(false))
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Review(args) => handlers::handle_review(args, cli.config.as_deref()).await,
        Commands::Config { path } => {
            handlers::handle_config(path, cli.config.as_deref()).map(|()| ExitCode::SUCCESS)
        }
    };

    outcome.unwrap_or_else(|error| {
        emit_error(&format!("Error: {error:#}"));
        ExitCode::FAILURE
    })
}
