//! The per-repository stage chain.
//!
//! ```text
//! START → ELIGIBLE? → RESOLVE_OID → CREATE_BRANCH (best effort)
//!       → COMMIT (fatal gate) → OPEN_PR → END
//! ```
//!
//! Each remote call is awaited before the next stage starts. A fatal error
//! jumps straight to the end; recoverable ones are collected as warnings.

use domain::{
    BranchName, CodeRepository, CompletedRun, Eligibility, PullRequestManager,
    RepositoryDescriptor, RunId, RunOptions, RunOutcome, StageResult, TemplateRenderer,
};
use tracing::Instrument;

use crate::{
    check_eligibility, compose_and_commit, create_branch, open_pull_request,
    resolve_default_branch_head, simulate_pull_request,
};

/// Runs every stage against one repository.
///
/// Runs are independent: nothing is shared between two calls except what the
/// hosting service itself stores.
pub async fn replace_node_workflows<C, T>(
    client: &C,
    templates: &T,
    repository: &RepositoryDescriptor,
    options: RunOptions,
) -> RunOutcome
where
    C: CodeRepository + PullRequestManager + ?Sized,
    T: TemplateRenderer + ?Sized,
{
    let run_id = RunId::new_random();
    let span = tracing::info_span!(
        "replace_node_workflows",
        run_id = %run_id,
        nwo = %repository.nwo,
        dry_run = options.dry_run,
    );

    run_stages(client, templates, repository, options)
        .instrument(span)
        .await
}

async fn run_stages<C, T>(
    client: &C,
    templates: &T,
    repository: &RepositoryDescriptor,
    options: RunOptions,
) -> RunOutcome
where
    C: CodeRepository + PullRequestManager + ?Sized,
    T: TemplateRenderer + ?Sized,
{
    match check_eligibility(client, repository, options).await {
        Ok(Eligibility::Eligible) => {}
        Ok(Eligibility::Ineligible(reason)) => return RunOutcome::Ineligible(reason),
        Err(err) => {
            tracing::error!(change = false, stage = %err.stage(), "{}", err.detail());
            return RunOutcome::Aborted(err);
        }
    }

    let oid = match resolve_default_branch_head(client, &repository.nwo, &repository.default_branch)
        .await
    {
        Ok(oid) => oid,
        Err(err) => {
            tracing::error!(change = false, stage = %err.stage(), "{}", err.detail());
            return RunOutcome::Aborted(err);
        }
    };

    let branch = BranchName::pull_request_target();
    let mut warnings = Vec::new();

    match create_branch(client, &repository.id, &branch, &oid, options).await {
        StageResult::Completed(()) | StageResult::Skipped => {}
        StageResult::Recoverable(err) => warnings.push(err),
        StageResult::Fatal(err) => return RunOutcome::Aborted(err),
    }

    let commit = match compose_and_commit(client, templates, repository, &branch, &oid, options)
        .await
    {
        StageResult::Completed(commit) => commit,
        StageResult::Skipped => {
            return RunOutcome::DryRun(simulate_pull_request(repository, &branch, &oid));
        }
        StageResult::Recoverable(err) | StageResult::Fatal(err) => {
            return RunOutcome::Aborted(err);
        }
    };

    let pull_request =
        match open_pull_request(client, &repository.id, &repository.default_branch, &branch).await
        {
            StageResult::Completed(url) => Some(url),
            StageResult::Skipped => None,
            StageResult::Recoverable(err) => {
                warnings.push(err);
                None
            }
            StageResult::Fatal(err) => return RunOutcome::Aborted(err),
        };

    RunOutcome::Completed(CompletedRun {
        commit,
        pull_request,
        warnings,
    })
}
