//! replace-node-ci entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration**: flags and environment via `clap`.
//! 2. **Wire observability**: `tracing-subscriber` with a JSON (or pretty)
//!    layer, plus an OpenTelemetry OTLP exporter when
//!    `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
//! 3. **Construct infrastructure**: the `GithubClient` and the workflow
//!    template set.
//! 4. **Drive runs**: fetch each repository's metadata and run the stage
//!    chain once per repository, in order. The exit code is non-zero when any
//!    run was aborted.

mod config;
mod harness;
mod telemetry;

use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use github::GithubClient;
use templates::WorkflowTemplates;

use crate::config::Cli;
use crate::harness::process_repositories;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let telemetry = telemetry::init(cli.log_format)?;

    let client = GithubClient::new(cli.github_config()).context("building GitHub client")?;
    let templates = match &cli.templates_dir {
        Some(dir) => WorkflowTemplates::with_overrides(dir.clone()),
        None => WorkflowTemplates::embedded(),
    };
    let options = cli.run_options();

    let summary = process_repositories(&client, &templates, &cli.repos, options).await;

    tracing::info!(
        repositories = summary.processed,
        aborted = summary.aborted,
        dry_run = options.dry_run,
        "done"
    );
    telemetry.shutdown();

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
