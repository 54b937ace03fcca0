//! End-to-end CLI tests using `assert_cmd`
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::tests_outside_test_module,
        reason = "Test allows"
    )
)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const VALID_SNIPPET: &str = "def total(items):\n    return sum(item.price for item in items)\n";

/// Runs the built `critic` binary with a clean environment.
fn critic() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_critic"));
    command
        .env("RUST_LOG", "off")
        .env_remove("OPENROUTER_API_KEY")
        .env_remove("GROQ_API_KEY");
    command
}

/// Helper to create temp dir or fail test
fn temp_dir() -> TempDir {
    TempDir::new().unwrap_or_else(|err| panic!("Failed to create temp dir: {err}"))
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap_or_else(|err| panic!("Failed to write {name}: {err}"));
    path
}

#[test]
fn test_cli_help() {
    critic()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("review"));
}

#[test]
fn test_cli_invalid_command() {
    critic().arg("invalid-command-xyz").assert().failure();
}

#[test]
fn test_short_code_is_rejected_before_any_backend() {
    let temp = temp_dir();
    let snippet = write_file(temp.path(), "short.go", "x := 1");
    let config = temp.path().join("config.toml");

    critic()
        .args(["review", "--language", "go", "--skill", "advanced", "--config"])
        .arg(&config)
        .arg(&snippet)
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "Please enter at least 20 characters of code.",
        ));

    assert!(!config.exists(), "validation must fail before config is touched");
}

#[test]
fn test_unknown_language_is_rejected() {
    let temp = temp_dir();
    let snippet = write_file(temp.path(), "main.rb", VALID_SNIPPET);

    critic()
        .args(["review", "-l", "ruby", "-s", "beginner", "--config"])
        .arg(temp.path().join("config.toml"))
        .arg(&snippet)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Please select a language."));
}

#[test]
fn test_code_from_stdin() {
    let temp = temp_dir();

    critic()
        .args(["review", "-", "-l", "python", "-s", "expert", "--config"])
        .arg(temp.path().join("config.toml"))
        .write_stdin(VALID_SNIPPET)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Please select your skill level."));
}

#[test]
fn test_missing_input_file() {
    let temp = temp_dir();

    critic()
        .args(["review", "-l", "python", "-s", "beginner"])
        .arg(temp.path().join("nope.py"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_unreachable_backend_reports_generic_failure() {
    let temp = temp_dir();
    let snippet = write_file(temp.path(), "cart.py", VALID_SNIPPET);
    let config = write_file(
        temp.path(),
        "config.toml",
        "[backend]\nprovider = \"ollama\"\nbase_url = \"http://127.0.0.1:9\"\n\n[generation]\ntimeout_seconds = 5\n",
    );

    critic()
        .args(["review", "-l", "python", "-s", "beginner", "--json", "--config"])
        .arg(&config)
        .arg(&snippet)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "An error occurred while evaluating your code. Please try again.",
        ));
}

#[test]
fn test_missing_api_key_is_reported() {
    let temp = temp_dir();
    let snippet = write_file(temp.path(), "cart.py", VALID_SNIPPET);
    let config = write_file(temp.path(), "config.toml", "[backend]\nprovider = \"groq\"\n");

    critic()
        .args(["review", "-l", "python", "-s", "beginner", "--config"])
        .arg(&config)
        .arg(&snippet)
        .assert()
        .failure()
        .stderr(predicate::str::contains("GROQ_API_KEY"));
}

#[test]
fn test_config_path() {
    let temp = temp_dir();
    let config = temp.path().join("critic.toml");

    critic()
        .args(["config", "--path", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("critic.toml"));
}

#[test]
fn test_config_masks_api_keys() {
    let temp = temp_dir();
    let config = write_file(
        temp.path(),
        "config.toml",
        "[api_keys]\nopenrouter_api_key = \"sk-or-v1-supersecret\"\n",
    );

    critic()
        .args(["config", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("********"))
        .stdout(predicate::str::contains("timeout_seconds = 60"))
        .stdout(predicate::str::contains("supersecret").not());
}

#[test]
fn test_config_created_on_first_run() {
    let temp = temp_dir();
    let config = temp.path().join("fresh").join("config.toml");

    critic().args(["config", "--config"]).arg(&config).assert().success();

    let written = fs::read_to_string(&config).unwrap();
    assert!(written.starts_with("# Critic Configuration File"));
}
