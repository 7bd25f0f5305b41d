//! Shared value types for a replacement run.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! the per-run inputs and the requests handed to the hosting ports.

use serde::{Deserialize, Serialize};

use crate::{BranchName, CommitOid, FileChange, NodeId, RepositoryNwo};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Repository metadata supplied by the harness; immutable for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    /// GraphQL node id, used by the ref and pull-request mutations.
    pub id: NodeId,

    /// Owner and name.
    pub nwo: RepositoryNwo,

    /// Branch the pull request targets.
    pub default_branch: BranchName,

    /// Private repositories do not receive the code-scanning or publish workflows.
    pub is_private: bool,

    /// Archived repositories are never touched.
    pub is_archived: bool,

    /// Disabled repositories are never touched.
    pub is_disabled: bool,

    /// Forks are never touched.
    pub is_fork: bool,

    /// Primary language as reported by GitHub (`None` when undetected).
    pub primary_language: Option<String>,

    /// Repository size in KB; `0` means the repository is empty.
    pub size_kb: u64,
}

/// Options controlling whether mutating calls are issued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Simulate the run: no ref, commit, or pull request is created.
    pub dry_run: bool,

    /// Emit skip reasons and recoverable failures to the log.
    pub verbose: bool,
}

// ---------------------------------------------------------------------------
// Template rendering
// ---------------------------------------------------------------------------

/// Values a workflow template may reference.
///
/// Serialised in camelCase so templates read `isPrivate`, `owner`, and `repo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderContext {
    /// Whether the target repository is private.
    pub is_private: bool,
    /// Repository owner login.
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

impl RenderContext {
    /// Builds the context for `repository`.
    pub fn for_repository(repository: &RepositoryDescriptor) -> Self {
        Self {
            is_private: repository.is_private,
            owner: repository.nwo.owner.to_string(),
            repo: repository.nwo.name.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Requests handed to the hosting ports
// ---------------------------------------------------------------------------

/// A single multi-file commit guarded by optimistic concurrency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRequest {
    /// Repository receiving the commit.
    pub nwo: RepositoryNwo,

    /// Branch the commit is appended to.
    pub branch: BranchName,

    /// The commit is rejected if the branch head is no longer this oid.
    pub expected_head_oid: CommitOid,

    /// Commit message headline.
    pub headline: String,

    /// Commit message body.
    pub body: String,

    /// Files added or replaced, in submission order.
    pub additions: Vec<FileChange>,
}

/// A request to open a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestRequest {
    /// GraphQL node id of the repository.
    pub repository_id: NodeId,
    /// Branch the changes are pulled into.
    pub base: BranchName,
    /// Branch carrying the changes.
    pub head: BranchName,
    /// Pull request title.
    pub title: String,
    /// Pull request body (Markdown).
    pub body: String,
}

// ---------------------------------------------------------------------------
// Fixed messages
// ---------------------------------------------------------------------------

/// Headline of the workflow commit and title of the pull request.
pub const CHANGE_TITLE: &str = "🤖 Replace Node workflows";

/// Body of the commit and pull request, crediting the tool.
pub const CHANGE_BODY: &str = "via [@stoe/octoherd-script-replace-node-ci](https://github.com/stoe/octoherd-script-replace-node-ci)";
