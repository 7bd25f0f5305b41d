//! replace-node-ci run orchestration.
//!
//! This crate provides one function per stage of a run and
//! [`replace_node_workflows`], which chains them for a single repository.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Stages sequence calls between business logic in the
//! [`domain`] crate and the port traits (hosting API, template renderer). They
//! contain no domain rules of their own.
//!
//! ## Failure tiers
//!
//! | Stage | On failure |
//! |-------|------------|
//! | [`check_eligibility`] | fatal (probe error only) |
//! | [`resolve_default_branch_head`] | fatal |
//! | [`create_branch`] | recoverable |
//! | [`compose_and_commit`] | fatal |
//! | [`open_pull_request`] | recoverable |

mod branch;
mod commit;
mod eligibility;
mod pull_request;
mod reference;
mod run;

#[cfg(test)]
mod testing;

pub use branch::create_branch;
pub use commit::{compose_and_commit, render_workflows};
pub use eligibility::check_eligibility;
pub use pull_request::{open_pull_request, simulate_pull_request};
pub use reference::resolve_default_branch_head;
pub use run::replace_node_workflows;
