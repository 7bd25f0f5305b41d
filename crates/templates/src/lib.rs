//! replace-node-ci workflow templates.
//!
//! Implements [`domain::TemplateRenderer`] over the workflow assets compiled
//! into the binary, optionally overridden file-by-file from a directory.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Template lookup and the text-substitution language live
//! here. Orchestration sees only [`domain::TemplateRenderer`].
//!
//! ## Assets
//!
//! | Name | Templated |
//! |------|-----------|
//! | `codeql.yml` | no |
//! | `test.yml` | no |
//! | `publish.yml.tpl` | yes, on `isPrivate`, `owner`, `repo` |

pub mod engine;

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use domain::{RenderContext, TemplateError, TemplateRenderer};

pub use engine::render_str;

const EMBEDDED: &[(&str, &str)] = &[
    ("codeql.yml", include_str!("../assets/codeql.yml")),
    ("test.yml", include_str!("../assets/test.yml")),
    ("publish.yml.tpl", include_str!("../assets/publish.yml.tpl")),
];

/// The workflow template set.
#[derive(Debug, Clone, Default)]
pub struct WorkflowTemplates {
    overrides: Option<PathBuf>,
}

impl WorkflowTemplates {
    /// Uses only the embedded assets.
    pub fn embedded() -> Self {
        Self::default()
    }

    /// Prefers `<dir>/<name>` over the embedded asset when that file exists.
    pub fn with_overrides(dir: impl Into<PathBuf>) -> Self {
        Self {
            overrides: Some(dir.into()),
        }
    }

    /// Directory consulted before the embedded assets, if any.
    pub fn overrides_dir(&self) -> Option<&Path> {
        self.overrides.as_deref()
    }

    /// Returns the raw text of template `name`.
    pub fn source(&self, name: &str) -> Result<Cow<'static, str>, TemplateError> {
        if let Some(dir) = &self.overrides {
            let path = dir.join(name);
            if path.is_file() {
                tracing::debug!(template = name, path = %path.display(), "using template override");
                return std::fs::read_to_string(&path)
                    .map(Cow::Owned)
                    .map_err(|err| TemplateError::Unreadable {
                        name: name.to_owned(),
                        message: err.to_string(),
                    });
            }
        }

        EMBEDDED
            .iter()
            .find(|(embedded, _)| *embedded == name)
            .map(|(_, text)| Cow::Borrowed(*text))
            .ok_or_else(|| TemplateError::NotFound {
                name: name.to_owned(),
            })
    }
}

impl TemplateRenderer for WorkflowTemplates {
    fn render(&self, name: &str, context: &RenderContext) -> Result<String, TemplateError> {
        let source = self.source(name)?;
        let context = serde_json::to_value(context).map_err(|err| TemplateError::Syntax {
            line: 0,
            message: format!("context is not serialisable: {err}"),
        })?;
        render_str(&source, &context)
    }
}
