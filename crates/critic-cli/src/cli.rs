use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use critic_core::ProviderKind;

/// Command-line arguments for the `critic` binary
#[derive(Parser, Debug)]
#[command(name = "critic")]
#[command(about = "Friendly, scored feedback on a code snippet", long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of ~/.critic/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Review a snippet and print feedback with scores
    Review(ReviewArgs),

    /// Show configuration
    Config {
        /// Only print where the config file lives
        #[arg(long)]
        path: bool,
    },
}

/// Arguments of `critic review`
#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// File holding the code, or `-` for stdin
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Language of the snippet (javascript, python, java, csharp, typescript, go)
    #[arg(short, long)]
    pub language: String,

    /// Your experience level (beginner, intermediate, advanced)
    #[arg(short, long)]
    pub skill: String,

    /// Free-text description of your coding style
    #[arg(long)]
    pub style: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Also ask for a plain-language explanation of the code
    #[arg(long)]
    pub explain: bool,

    /// Backend to use (overrides config)
    #[arg(long, value_parser = parse_provider)]
    pub provider: Option<ProviderKind>,

    /// Model to use (overrides config)
    #[arg(long)]
    pub model: Option<String>,
}

impl ReviewArgs {
    /// Whether the code should be read from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.input.as_os_str() == "-"
    }
}

/// Parses a backend name as accepted in the config file.
fn parse_provider(raw: &str) -> Result<ProviderKind, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "openrouter" => Ok(ProviderKind::OpenRouter),
        "groq" => Ok(ProviderKind::Groq),
        "ollama" => Ok(ProviderKind::Ollama),
        other => Err(format!(
            "unknown provider `{other}` (expected openrouter, groq or ollama)"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_review_arguments() {
        let cli = Cli::try_parse_from([
            "critic",
            "review",
            "main.py",
            "--language",
            "python",
            "--skill",
            "beginner",
            "--explain",
            "--provider",
            "Ollama",
        ])
        .unwrap();

        let Commands::Review(args) = cli.command else {
            panic!("expected review command");
        };
        assert_eq!(args.language, "python");
        assert!(args.explain);
        assert!(!args.json);
        assert_eq!(args.provider, Some(ProviderKind::Ollama));
        assert!(!args.reads_stdin());
    }

    #[test]
    fn dash_means_stdin() {
        let cli =
            Cli::try_parse_from(["critic", "review", "-", "-l", "go", "-s", "advanced"]).unwrap();
        let Commands::Review(args) = cli.command else {
            panic!("expected review command");
        };
        assert!(args.reads_stdin());
    }

    #[test]
    fn rejects_unknown_provider() {
        let result = Cli::try_parse_from([
            "critic", "review", "-", "-l", "go", "-s", "advanced", "--provider", "bedrock",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn config_path_is_global() {
        let cli = Cli::try_parse_from(["critic", "config", "--path", "--config", "/tmp/critic.toml"])
            .unwrap();
        assert!(matches!(cli.command, Commands::Config { path: true }));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/critic.toml")));
    }
}
