//! Stage 2: resolve the commit at the tip of the default branch.

use domain::{BranchName, CodeRepository, CommitOid, RepositoryNwo, RunError};

/// Returns the oid `default_branch` points at.
///
/// Every failure is fatal for the run: no mutating stage may start without a
/// resolved oid.
pub async fn resolve_default_branch_head<C>(
    client: &C,
    nwo: &RepositoryNwo,
    default_branch: &BranchName,
) -> Result<CommitOid, RunError>
where
    C: CodeRepository + ?Sized,
{
    let oid = client
        .get_branch_head(nwo, default_branch)
        .await
        .map_err(|source| RunError::ResolveReference {
            branch: default_branch.clone(),
            source,
        })?;
    tracing::debug!(branch = %default_branch, sha = oid.short(), "resolved default branch head");
    Ok(oid)
}
