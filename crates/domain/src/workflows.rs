//! The workflow files a run writes, and the pure assembly of the commit payload.
//!
//! Which files are committed depends only on whether the repository is
//! private; no network code is involved, so the rules here are exercised
//! directly by unit tests.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// One of the workflow files managed by this tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowFile {
    /// CodeQL security scanning. Public repositories only.
    CodeQl,
    /// Lint and test on every push. Always committed.
    Test,
    /// Package publishing on release. Public repositories only.
    Publish,
}

impl WorkflowFile {
    /// Every workflow in commit order.
    pub const ALL: [WorkflowFile; 3] = [Self::CodeQl, Self::Test, Self::Publish];

    /// Path of the file inside the target repository.
    pub fn path(self) -> &'static str {
        match self {
            Self::CodeQl => ".github/workflows/codeql.yml",
            Self::Test => ".github/workflows/test.yml",
            Self::Publish => ".github/workflows/publish.yml",
        }
    }

    /// Name of the template asset the file is rendered from.
    pub fn template_name(self) -> &'static str {
        match self {
            Self::CodeQl => "codeql.yml",
            Self::Test => "test.yml",
            Self::Publish => "publish.yml.tpl",
        }
    }

    /// Whether the file belongs in the commit for a repository of the given visibility.
    pub fn is_included(self, is_private: bool) -> bool {
        match self {
            Self::Test => true,
            Self::CodeQl | Self::Publish => !is_private,
        }
    }
}

/// Workflows committed for a repository of the given visibility, in commit order.
pub fn workflows_for(is_private: bool) -> Vec<WorkflowFile> {
    WorkflowFile::ALL
        .into_iter()
        .filter(|file| file.is_included(is_private))
        .collect()
}

/// Final text of one workflow after template rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedWorkflow {
    /// Which workflow this is.
    pub file: WorkflowFile,
    /// Rendered YAML.
    pub text: String,
}

/// One file added or replaced by the commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Path relative to the repository root.
    pub path: String,
    /// Standard, padded base64 of the file contents.
    pub contents_base64: String,
}

impl FileChange {
    /// Builds a change for `path`, base64-encoding `text`.
    pub fn encode(path: impl Into<String>, text: &str) -> Self {
        Self {
            path: path.into(),
            contents_base64: STANDARD.encode(text.as_bytes()),
        }
    }
}

/// Assembles the ordered commit payload.
///
/// The test workflow is always present; the code-scanning and publish
/// workflows are dropped for private repositories. Order follows
/// [`WorkflowFile::ALL`] regardless of the order of `rendered`.
pub fn build_file_change_list(is_private: bool, rendered: &[RenderedWorkflow]) -> Vec<FileChange> {
    workflows_for(is_private)
        .into_iter()
        .filter_map(|file| {
            rendered
                .iter()
                .find(|r| r.file == file)
                .map(|r| FileChange::encode(file.path(), &r.text))
        })
        .collect()
}
