//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use domain::{RepositoryNwo, RunOptions};
use github::{GithubConfig, DEFAULT_API_URL};

/// Log output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Human-readable lines.
    Pretty,
}

/// Replace legacy Node.js CI workflows through a pull request.
#[derive(Debug, Parser)]
#[command(name = "replace-node-ci", version, about)]
pub struct Cli {
    /// GitHub token with `repo` and `workflow` scopes
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Repository to process; repeat for several, processed in order
    #[arg(
        long = "repo",
        value_name = "OWNER/NAME",
        required = true,
        value_parser = RepositoryNwo::parse
    )]
    pub repos: Vec<RepositoryNwo>,

    /// Report what would change without creating anything
    #[arg(long)]
    pub dry_run: bool,

    /// Log skipped repositories and recoverable failures
    #[arg(short, long)]
    pub verbose: bool,

    /// REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// GraphQL endpoint [default: <API_URL>/graphql, or /api/graphql for an /api/v3 API_URL]
    #[arg(long, env = "GITHUB_GRAPHQL_URL")]
    pub graphql_url: Option<String>,

    /// Directory whose files replace the embedded templates of the same name
    #[arg(long, value_name = "DIR")]
    pub templates_dir: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    /// Per-request HTTP timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

impl Cli {
    /// Options handed to every run.
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            dry_run: self.dry_run,
            verbose: self.verbose,
        }
    }

    /// Connection settings for the GitHub client.
    pub fn github_config(&self) -> GithubConfig {
        GithubConfig {
            api_url: self.api_url.clone(),
            graphql_url: self.graphql_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            ..GithubConfig::new(self.token.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_repositories_and_flags() {
        let cli = Cli::try_parse_from([
            "replace-node-ci",
            "--token",
            "t",
            "--repo",
            "stoe/a",
            "--repo",
            "stoe/b",
            "--dry-run",
            "-v",
            "--log-format",
            "pretty",
        ])
        .unwrap();

        let repos: Vec<_> = cli.repos.iter().map(ToString::to_string).collect();
        assert_eq!(repos, ["stoe/a", "stoe/b"]);
        assert_eq!(
            cli.run_options(),
            RunOptions {
                dry_run: true,
                verbose: true
            }
        );
        assert_eq!(cli.log_format, LogFormat::Pretty);
    }

    #[test]
    fn rejects_malformed_repository() {
        let result = Cli::try_parse_from(["replace-node-ci", "--token", "t", "--repo", "stoe"]);
        assert!(result.is_err());
    }

    #[test]
    fn builds_client_config_from_flags() {
        let cli = Cli::try_parse_from([
            "replace-node-ci",
            "--token",
            "t",
            "--repo",
            "stoe/a",
            "--api-url",
            "https://ghe.example.com/api/v3",
            "--timeout-secs",
            "5",
        ])
        .unwrap();
        let config = cli.github_config();
        assert_eq!(config.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.token, "t");
        assert_eq!(config.graphql_url, None);
    }
}
