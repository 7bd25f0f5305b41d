//! What a single repository run reports back to its caller.

use serde::Serialize;

use crate::{BranchName, CommitOid, PullRequestUrl, RunError, SkipReason};

/// The record a dry run logs instead of mutating anything.
///
/// `head` names the default branch and `base` the workflow branch, matching the
/// fields of the dry-run log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DryRunReport {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Repository visibility.
    pub private: bool,
    /// Default branch name.
    pub head: BranchName,
    /// Workflow branch name without `refs/heads/`.
    pub base: BranchName,
    /// Paths of the workflow files that would be committed.
    pub workflows: Vec<String>,
    /// Abbreviated oid of the default branch head.
    pub sha: String,
}

/// A run that reached the end of the stage chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedRun {
    /// Oid of the workflow commit.
    pub commit: CommitOid,
    /// URL of the opened pull request, `None` if opening it failed.
    pub pull_request: Option<PullRequestUrl>,
    /// Recoverable failures encountered along the way.
    pub warnings: Vec<RunError>,
}

/// Terminal state of one repository run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The repository was filtered out; nothing was called after the filter.
    Ineligible(SkipReason),
    /// Dry run finished; no mutating call was made.
    DryRun(DryRunReport),
    /// Commit was created; the pull request may or may not have been opened.
    Completed(CompletedRun),
    /// A fatal error stopped the run.
    Aborted(RunError),
}

impl RunOutcome {
    /// Whether the repository was changed by this run.
    pub fn changed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Whether the run stopped on a fatal error.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }
}
