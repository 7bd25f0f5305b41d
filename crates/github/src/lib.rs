//! replace-node-ci GitHub infrastructure adapter.
//!
//! Implements the hosting ports defined in the [`domain`] crate
//! ([`domain::CodeRepository`], [`domain::PullRequestManager`]) with `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules.
//! Authentication, endpoint layout, and error-body decoding are handled here;
//! the [`domain`] crate never sees them.
//!
//! ## Endpoints
//!
//! | Port method | API |
//! |-------------|-----|
//! | `get_repository` | REST `GET /repos/{owner}/{repo}` |
//! | `file_exists` | REST `GET /repos/{owner}/{repo}/contents/{path}` |
//! | `get_branch_head` | REST `GET /repos/{owner}/{repo}/git/ref/heads/{branch}` |
//! | `create_ref` | GraphQL `createRef` |
//! | `create_commit_on_branch` | GraphQL `createCommitOnBranch` |
//! | `create_pull_request` | GraphQL `createPullRequest` |

mod client;
mod pull_requests;
mod repository;

pub use client::{
    default_graphql_url, ClientBuildError, GithubClient, GithubConfig, DEFAULT_API_URL,
};
