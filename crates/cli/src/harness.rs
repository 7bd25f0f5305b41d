//! Sequential per-repository driver.

use domain::{
    CodeRepository, PullRequestManager, RepositoryNwo, RunOptions, RunOutcome, TemplateRenderer,
};
use stages::replace_node_workflows;

/// Tally of one invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Repositories attempted, including failed lookups.
    pub processed: usize,
    /// Runs stopped by a fatal error, plus failed metadata lookups.
    pub aborted: usize,
}

impl Summary {
    /// Whether the process should exit successfully.
    pub fn is_success(&self) -> bool {
        self.aborted == 0
    }
}

/// Looks up each repository and runs the stage chain against it, one at a time.
pub async fn process_repositories<C, T>(
    client: &C,
    templates: &T,
    repos: &[RepositoryNwo],
    options: RunOptions,
) -> Summary
where
    C: CodeRepository + PullRequestManager + ?Sized,
    T: TemplateRenderer + ?Sized,
{
    let mut summary = Summary::default();
    for nwo in repos {
        summary.processed += 1;

        let repository = match client.get_repository(nwo).await {
            Ok(repository) => repository,
            Err(err) => {
                tracing::error!(change = false, nwo = %nwo, "{}", err.detail());
                summary.aborted += 1;
                continue;
            }
        };

        match replace_node_workflows(client, templates, &repository, options).await {
            RunOutcome::Ineligible(reason) => {
                tracing::debug!(nwo = %nwo, reason = ?reason, "repository skipped");
            }
            RunOutcome::Aborted(err) => {
                tracing::debug!(nwo = %nwo, stage = %err.stage(), "run aborted");
                summary.aborted += 1;
            }
            RunOutcome::DryRun(_) | RunOutcome::Completed(_) => {}
        }
    }
    summary
}
