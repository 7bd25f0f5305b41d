//! Port traits implemented by infrastructure crates.
//!
//! The orchestration layer depends only on these traits; the `github` crate
//! supplies the HTTP implementations and `templates` the renderer. Tests
//! substitute in-memory fakes.

use async_trait::async_trait;

use crate::{
    BranchName, CommitOid, CommitRequest, HostingError, NodeId, PullRequestRequest,
    PullRequestUrl, RenderContext, RepositoryDescriptor, RepositoryNwo, TemplateError,
};

/// Read and write access to a repository's Git data.
#[async_trait]
pub trait CodeRepository: Send + Sync {
    /// Fetches the metadata of `nwo`.
    async fn get_repository(&self, nwo: &RepositoryNwo)
        -> Result<RepositoryDescriptor, HostingError>;

    /// Returns whether `path` exists on the default branch.
    ///
    /// Absence is `Ok(false)`; only failures other than "not found" are errors.
    async fn file_exists(&self, nwo: &RepositoryNwo, path: &str) -> Result<bool, HostingError>;

    /// Returns the oid `branch` points at.
    async fn get_branch_head(
        &self,
        nwo: &RepositoryNwo,
        branch: &BranchName,
    ) -> Result<CommitOid, HostingError>;

    /// Creates `branch` at `oid`. Fails when the branch already exists.
    async fn create_ref(
        &self,
        repository_id: &NodeId,
        branch: &BranchName,
        oid: &CommitOid,
    ) -> Result<(), HostingError>;

    /// Appends one commit to `request.branch` and returns its oid.
    async fn create_commit_on_branch(
        &self,
        request: &CommitRequest,
    ) -> Result<CommitOid, HostingError>;
}

/// Pull request creation.
#[async_trait]
pub trait PullRequestManager: Send + Sync {
    /// Opens a pull request and returns its URL.
    async fn create_pull_request(
        &self,
        request: &PullRequestRequest,
    ) -> Result<PullRequestUrl, HostingError>;
}

/// Pure text rendering of a named template.
pub trait TemplateRenderer: Send + Sync {
    /// Renders the template called `name` against `context`.
    fn render(&self, name: &str, context: &RenderContext) -> Result<String, TemplateError>;
}
