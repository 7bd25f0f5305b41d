//! Stage 3: create the workflow branch.

use domain::{BranchName, CodeRepository, CommitOid, NodeId, RunError, RunOptions, StageResult};

/// Creates `branch` at `oid`; skipped on a dry run.
///
/// Failure is recoverable. The usual cause is a branch left behind by an
/// earlier run, and the commit stage can still target it.
pub async fn create_branch<C>(
    client: &C,
    repository_id: &NodeId,
    branch: &BranchName,
    oid: &CommitOid,
    options: RunOptions,
) -> StageResult<()>
where
    C: CodeRepository + ?Sized,
{
    if options.dry_run {
        return StageResult::Skipped;
    }

    match client.create_ref(repository_id, branch, oid).await {
        Ok(()) => {
            tracing::debug!(branch = %branch, "branch created");
            StageResult::Completed(())
        }
        Err(source) => {
            let err = RunError::CreateBranch {
                branch: branch.clone(),
                source,
            };
            if options.verbose {
                tracing::warn!(change = false, "{}", err.detail());
            }
            StageResult::Recoverable(err)
        }
    }
}
