//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging, for example, a
//! GraphQL [`NodeId`] with a [`BranchName`] even though both are strings under the
//! hood.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Prefix GitHub uses for fully-qualified branch references.
pub const HEADS_PREFIX: &str = "refs/heads/";

/// The branch every run pushes to, identical across runs and repositories.
pub const PULL_REQUEST_BRANCH: &str = "refs/heads/octoherd/replace-node-workflows";

/// Raised when a raw value cannot be turned into an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// A commit id was not 40 (SHA-1) or 64 (SHA-256) hexadecimal characters.
    #[error("'{value}' is not a valid commit oid")]
    InvalidOid {
        /// The rejected input.
        value: String,
    },

    /// A repository reference was not in `owner/name` form.
    #[error("'{value}' is not in owner/name form")]
    InvalidNameWithOwner {
        /// The rejected input.
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed
// ---------------------------------------------------------------------------

string_id! {
    /// Opaque GraphQL node identifier of a repository (e.g. `"R_kgDOAbc123"`).
    ///
    /// The mutations that create refs and pull requests address the repository
    /// by this id rather than by name.
    NodeId
}

string_id! {
    /// Login of the user or organisation owning a repository.
    RepositoryOwner
}

string_id! {
    /// Repository name without its owner.
    RepositoryName
}

string_id! {
    /// URL of a pull request opened by a run.
    PullRequestUrl
}

string_id! {
    /// A short Git branch name (e.g. `"main"`, `"octoherd/replace-node-workflows"`).
    ///
    /// Always stored without the `refs/heads/` prefix; use [`BranchName::qualified`]
    /// where the API expects a fully-qualified ref.
    BranchName
}

impl BranchName {
    /// Creates a branch name from either a short name or a `refs/heads/` ref.
    pub fn from_ref(value: &str) -> Option<Self> {
        Self::new(value.strip_prefix(HEADS_PREFIX).unwrap_or(value))
    }

    /// The fixed branch that carries the replacement workflows.
    pub fn pull_request_target() -> Self {
        Self(PULL_REQUEST_BRANCH.trim_start_matches(HEADS_PREFIX).to_owned())
    }

    /// Returns the fully-qualified form, `refs/heads/<name>`.
    pub fn qualified(&self) -> String {
        format!("{HEADS_PREFIX}{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Commit object id
// ---------------------------------------------------------------------------

/// A Git commit object id: 40 (SHA-1) or 64 (SHA-256) lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitOid(String);

impl CommitOid {
    /// Validates and normalises `value` to lowercase.
    pub fn parse(value: &str) -> Result<Self, IdentifierError> {
        let valid_len = matches!(value.len(), 40 | 64);
        if valid_len && value.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(value.to_ascii_lowercase()))
        } else {
            Err(IdentifierError::InvalidOid {
                value: value.to_owned(),
            })
        }
    }

    /// Returns the full oid.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the 7-character abbreviation used in log records.
    pub fn short(&self) -> &str {
        &self.0[..7]
    }
}

impl TryFrom<String> for CommitOid {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CommitOid> for String {
    fn from(oid: CommitOid) -> Self {
        oid.0
    }
}

impl std::fmt::Display for CommitOid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Name with owner
// ---------------------------------------------------------------------------

/// The `owner/name` compound identifier of a repository ("nwo").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryNwo {
    /// Owning user or organisation.
    pub owner: RepositoryOwner,
    /// Repository name.
    pub name: RepositoryName,
}

impl RepositoryNwo {
    /// Creates an nwo from its two halves.
    pub fn new(owner: RepositoryOwner, name: RepositoryName) -> Self {
        Self { owner, name }
    }

    /// Parses `"owner/name"`. Exactly one `/` with non-empty halves is accepted.
    pub fn parse(value: &str) -> Result<Self, IdentifierError> {
        let invalid = || IdentifierError::InvalidNameWithOwner {
            value: value.to_owned(),
        };
        let (owner, name) = value.split_once('/').ok_or_else(invalid)?;
        if name.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            owner: RepositoryOwner::new(owner).ok_or_else(invalid)?,
            name: RepositoryName::new(name).ok_or_else(invalid)?,
        })
    }
}

impl std::fmt::Display for RepositoryNwo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies one repository run.
///
/// Generated fresh for every run; recorded on the run's tracing span so all
/// activity against one repository can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
