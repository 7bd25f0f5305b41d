//! Metadata rules deciding whether a repository is processed at all.
//!
//! Only the checks that need nothing beyond [`RepositoryDescriptor`] live here.
//! The monorepo probe needs the hosting API and is run by the orchestration
//! layer after [`screen_metadata`] passes.

use serde::{Deserialize, Serialize};

use crate::RepositoryDescriptor;

/// Lower-cased primary language a repository must have.
pub const TARGET_LANGUAGE: &str = "javascript";

/// Root-level file whose presence marks a Lerna monorepo.
pub const MONOREPO_MANIFEST: &str = "lerna.json";

/// Why a repository was not processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum SkipReason {
    /// Repository is archived.
    Archived,
    /// Repository is disabled.
    Disabled,
    /// Repository is a fork.
    Fork,
    /// Repository has no content.
    Empty,
    /// Primary language is not [`TARGET_LANGUAGE`].
    Language {
        /// Normalised language, `None` when GitHub detected none.
        found: Option<String>,
    },
    /// A monorepo manifest was found at the root.
    Monorepo {
        /// Path of the manifest.
        manifest: String,
    },
}

/// Result of the eligibility filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// Process the repository.
    Eligible,
    /// Stop; nothing is done for this repository.
    Ineligible(SkipReason),
}

/// Lower-cases a language name, keeping absence as `None`.
pub fn normalize_language(language: Option<&str>) -> Option<String> {
    language.map(str::to_lowercase)
}

/// Applies the metadata rules in order and returns the first that rejects.
///
/// Returns `None` when the repository passes every metadata rule.
pub fn screen_metadata(repository: &RepositoryDescriptor) -> Option<SkipReason> {
    if repository.is_archived {
        return Some(SkipReason::Archived);
    }
    if repository.is_disabled {
        return Some(SkipReason::Disabled);
    }
    if repository.is_fork {
        return Some(SkipReason::Fork);
    }
    if repository.size_kb == 0 {
        return Some(SkipReason::Empty);
    }

    let language = normalize_language(repository.primary_language.as_deref());
    if language.as_deref() != Some(TARGET_LANGUAGE) {
        return Some(SkipReason::Language { found: language });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BranchName, NodeId, RepositoryNwo};

    fn repository() -> RepositoryDescriptor {
        RepositoryDescriptor {
            id: NodeId::new("R_1").unwrap(),
            nwo: RepositoryNwo::parse("stoe/demo").unwrap(),
            default_branch: BranchName::new("main").unwrap(),
            is_private: false,
            is_archived: false,
            is_disabled: false,
            is_fork: false,
            primary_language: Some("JavaScript".into()),
            size_kb: 120,
        }
    }

    #[test]
    fn javascript_repository_passes() {
        assert_eq!(screen_metadata(&repository()), None);
    }

    #[test]
    fn flags_are_checked_in_order() {
        let mut repo = repository();
        repo.is_fork = true;
        repo.size_kb = 0;
        assert_eq!(screen_metadata(&repo), Some(SkipReason::Fork));

        repo.is_archived = true;
        assert_eq!(screen_metadata(&repo), Some(SkipReason::Archived));
    }

    #[test]
    fn empty_repository_is_skipped() {
        let repo = RepositoryDescriptor {
            size_kb: 0,
            ..repository()
        };
        assert_eq!(screen_metadata(&repo), Some(SkipReason::Empty));
    }

    #[test]
    fn language_comparison_ignores_case() {
        let repo = RepositoryDescriptor {
            primary_language: Some("JAVASCRIPT".into()),
            ..repository()
        };
        assert_eq!(screen_metadata(&repo), None);
    }

    #[test]
    fn other_or_missing_language_is_skipped() {
        let repo = RepositoryDescriptor {
            primary_language: Some("TypeScript".into()),
            ..repository()
        };
        assert_eq!(
            screen_metadata(&repo),
            Some(SkipReason::Language {
                found: Some("typescript".into())
            })
        );

        let repo = RepositoryDescriptor {
            primary_language: None,
            ..repository()
        };
        assert_eq!(
            screen_metadata(&repo),
            Some(SkipReason::Language { found: None })
        );
    }
}
