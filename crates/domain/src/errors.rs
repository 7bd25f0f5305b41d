//! Error types and the per-stage result used by the run orchestration.
//!
//! [`HostingError`] covers failures reported by the hosting API adapters;
//! [`TemplateError`] covers rendering failures. [`RunError`] binds either of
//! them to the [`Stage`] in which it occurred, and [`StageResult`] makes the
//! fatal/recoverable distinction a first-class value instead of a control-flow
//! side effect.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{BranchName, IdentifierError};

// ---------------------------------------------------------------------------
// Hosting API errors
// ---------------------------------------------------------------------------

/// Failure reported by a hosting port.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostingError {
    /// The addressed resource does not exist (HTTP 404).
    #[error("{resource} not found")]
    NotFound {
        /// What was looked up.
        resource: String,
    },

    /// The API answered with a non-success HTTP status.
    #[error("GitHub API returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Top-level `message` of the error body.
        message: String,
        /// Structured entries of the `errors` array, if any.
        errors: Vec<String>,
    },

    /// The GraphQL endpoint answered with an `errors` list.
    #[error("GraphQL request failed: {}", .errors.join("; "))]
    GraphQl {
        /// `message` of each reported error, in order.
        errors: Vec<String>,
    },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("transport failure: {message}")]
    Transport {
        /// Description from the HTTP client.
        message: String,
    },

    /// The response could not be interpreted.
    #[error("unexpected response: {message}")]
    InvalidResponse {
        /// What was wrong with it.
        message: String,
    },
}

impl HostingError {
    /// The message surfaced to the log: the first structured error detail when
    /// the API returned a list, otherwise the error's own message.
    pub fn detail(&self) -> String {
        match self {
            Self::Api { errors, .. } | Self::GraphQl { errors } if !errors.is_empty() => {
                errors[0].clone()
            }
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Returns `true` for a 404-style absence.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<IdentifierError> for HostingError {
    fn from(err: IdentifierError) -> Self {
        Self::InvalidResponse {
            message: err.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Template errors
// ---------------------------------------------------------------------------

/// Failure to turn a template into workflow text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// No template with this name is known.
    #[error("template '{name}' not found")]
    NotFound {
        /// Requested template name.
        name: String,
    },

    /// The template could not be read from disk.
    #[error("template '{name}' could not be read: {message}")]
    Unreadable {
        /// Requested template name.
        name: String,
        /// I/O error description.
        message: String,
    },

    /// The template references a value the context does not provide.
    #[error("line {line}: unknown variable '{variable}'")]
    UnknownVariable {
        /// 1-based line of the reference.
        line: usize,
        /// Referenced name.
        variable: String,
    },

    /// The template text is malformed.
    #[error("line {line}: {message}")]
    Syntax {
        /// 1-based line of the offending tag.
        line: usize,
        /// What is wrong.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// The stages of one run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Metadata screen and monorepo probe.
    Eligibility,
    /// Lookup of the default branch head.
    ResolveReference,
    /// Creation of the workflow branch.
    CreateBranch,
    /// Rendering and submission of the workflow commit.
    Commit,
    /// Opening of the pull request.
    OpenPullRequest,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Eligibility => "eligibility",
            Self::ResolveReference => "resolve_reference",
            Self::CreateBranch => "create_branch",
            Self::Commit => "commit",
            Self::OpenPullRequest => "open_pull_request",
        };
        f.write_str(name)
    }
}

/// A failure of one stage of a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// The monorepo probe failed for a reason other than absence.
    #[error("probe for '{path}' failed: {source}")]
    EligibilityProbe {
        /// Probed file.
        path: String,
        /// Underlying failure.
        source: HostingError,
    },

    /// The default branch head could not be resolved.
    #[error("could not resolve head of '{branch}': {source}")]
    ResolveReference {
        /// Default branch.
        branch: BranchName,
        /// Underlying failure.
        source: HostingError,
    },

    /// The workflow branch could not be created.
    #[error("could not create branch '{branch}': {source}")]
    CreateBranch {
        /// Branch that was to be created.
        branch: BranchName,
        /// Underlying failure.
        source: HostingError,
    },

    /// A workflow template failed to render.
    #[error("could not render template '{template}': {source}")]
    Render {
        /// Template name.
        template: String,
        /// Underlying failure.
        source: TemplateError,
    },

    /// The workflow commit was rejected.
    #[error("could not commit to '{branch}': {source}")]
    Commit {
        /// Branch the commit targeted.
        branch: BranchName,
        /// Underlying failure.
        source: HostingError,
    },

    /// The pull request could not be opened.
    #[error("could not open pull request: {source}")]
    OpenPullRequest {
        /// Underlying failure.
        source: HostingError,
    },
}

impl RunError {
    /// The stage that produced this error.
    pub fn stage(&self) -> Stage {
        match self {
            Self::EligibilityProbe { .. } => Stage::Eligibility,
            Self::ResolveReference { .. } => Stage::ResolveReference,
            Self::CreateBranch { .. } => Stage::CreateBranch,
            Self::Render { .. } | Self::Commit { .. } => Stage::Commit,
            Self::OpenPullRequest { .. } => Stage::OpenPullRequest,
        }
    }

    /// The user-facing message; see [`HostingError::detail`].
    pub fn detail(&self) -> String {
        match self {
            Self::EligibilityProbe { source, .. }
            | Self::ResolveReference { source, .. }
            | Self::CreateBranch { source, .. }
            | Self::Commit { source, .. }
            | Self::OpenPullRequest { source } => source.detail(),
            Self::Render { .. } => self.to_string(),
        }
    }
}

/// Outcome of a single stage.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageResult<T> {
    /// The stage ran and produced its value.
    Completed(T),
    /// The stage was not run (dry-run).
    Skipped,
    /// The stage failed; the run continues.
    Recoverable(RunError),
    /// The stage failed; the run stops here.
    Fatal(RunError),
}

impl<T> StageResult<T> {
    /// Returns `true` when the run must not proceed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_prefers_first_structured_error() {
        let err = HostingError::GraphQl {
            errors: vec![
                "A ref named \"refs/heads/x\" already exists".into(),
                "second".into(),
            ],
        };
        assert_eq!(err.detail(), "A ref named \"refs/heads/x\" already exists");

        let err = HostingError::Api {
            status: 422,
            message: "Validation Failed".into(),
            errors: vec!["Reference already exists".into()],
        };
        assert_eq!(err.detail(), "Reference already exists");
    }

    #[test]
    fn detail_falls_back_to_generic_message() {
        let err = HostingError::Api {
            status: 500,
            message: "Server Error".into(),
            errors: vec![],
        };
        assert_eq!(err.detail(), "Server Error");

        let err = HostingError::Transport {
            message: "timed out".into(),
        };
        assert_eq!(err.detail(), "transport failure: timed out");
    }

    #[test]
    fn render_failures_belong_to_the_commit_stage() {
        let err = RunError::Render {
            template: "publish.yml.tpl".into(),
            source: TemplateError::Syntax {
                line: 3,
                message: "unclosed block".into(),
            },
        };
        assert_eq!(err.stage(), Stage::Commit);
        assert_eq!(
            err.detail(),
            "could not render template 'publish.yml.tpl': line 3: unclosed block"
        );
    }
}
