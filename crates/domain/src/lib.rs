//! Core domain for replace-node-ci.
//!
//! This crate contains every domain concept, newtype identifier, and error type
//! used to replace a repository's Node.js CI workflows through a pull request.
//! Infrastructure crates implement the port traits defined here; they never add
//! domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`NodeId`, `CommitOid`, `BranchName`, etc.) |
//! | [`types`] | Run inputs and port requests (`RepositoryDescriptor`, `CommitRequest`, etc.) |
//! | [`eligibility`] | Metadata rules that decide whether a repository is processed |
//! | [`workflows`] | Managed workflow files and commit payload assembly |
//! | [`errors`] | Hosting, template, and stage errors; `StageResult` |
//! | [`outcome`] | Terminal run states |
//! | [`ports`] | Traits implemented by infrastructure crates |

pub mod eligibility;
pub mod errors;
pub mod identifiers;
pub mod outcome;
pub mod ports;
pub mod types;
pub mod workflows;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use eligibility::{
    normalize_language, screen_metadata, Eligibility, SkipReason, MONOREPO_MANIFEST,
    TARGET_LANGUAGE,
};
pub use errors::{HostingError, RunError, Stage, StageResult, TemplateError};
pub use identifiers::{
    BranchName, CommitOid, IdentifierError, NodeId, PullRequestUrl, RepositoryName,
    RepositoryNwo, RepositoryOwner, RunId, HEADS_PREFIX, PULL_REQUEST_BRANCH,
};
pub use outcome::{CompletedRun, DryRunReport, RunOutcome};
pub use ports::{CodeRepository, PullRequestManager, TemplateRenderer};
pub use types::{
    CommitRequest, PullRequestRequest, RenderContext, RepositoryDescriptor, RunOptions,
    CHANGE_BODY, CHANGE_TITLE,
};
pub use workflows::{
    build_file_change_list, workflows_for, FileChange, RenderedWorkflow, WorkflowFile,
};
