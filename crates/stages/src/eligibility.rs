//! Stage 1: decide whether the repository is processed at all.

use domain::{
    screen_metadata, CodeRepository, Eligibility, RepositoryDescriptor, RunError, RunOptions,
    SkipReason, MONOREPO_MANIFEST,
};

/// Applies the metadata rules, then probes for a monorepo manifest.
///
/// Archived, disabled, forked, and empty repositories are skipped silently.
/// The language and monorepo skips are logged when `options.verbose` is set.
/// A probe failure other than "not found" is returned as an error: eligibility
/// cannot be decided, so nothing further may run.
pub async fn check_eligibility<C>(
    client: &C,
    repository: &RepositoryDescriptor,
    options: RunOptions,
) -> Result<Eligibility, RunError>
where
    C: CodeRepository + ?Sized,
{
    if let Some(reason) = screen_metadata(repository) {
        if let SkipReason::Language { found } = &reason {
            if options.verbose {
                tracing::info!(change = false, lang = ?found, "not a javascript repository");
            }
        }
        return Ok(Eligibility::Ineligible(reason));
    }

    let is_monorepo = client
        .file_exists(&repository.nwo, MONOREPO_MANIFEST)
        .await
        .map_err(|source| RunError::EligibilityProbe {
            path: MONOREPO_MANIFEST.to_owned(),
            source,
        })?;

    if is_monorepo {
        if options.verbose {
            tracing::warn!(change = false, "skipping lerna repository");
        }
        return Ok(Eligibility::Ineligible(SkipReason::Monorepo {
            manifest: MONOREPO_MANIFEST.to_owned(),
        }));
    }

    Ok(Eligibility::Eligible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{capture_logs, repository, Call, FakeHost, Probe};
    use domain::HostingError;
    use tracing::Level;

    #[tokio::test]
    async fn eligible_repository_is_probed_once() {
        let host = FakeHost::new();
        let result = check_eligibility(&host, &repository(), RunOptions::default()).await;
        assert_eq!(result, Ok(Eligibility::Eligible));
        assert_eq!(host.calls(), [Call::FileExists("lerna.json".into())]);
    }

    #[tokio::test]
    async fn flagged_repositories_are_skipped_without_calls() {
        let host = FakeHost::new();
        let logs = capture_logs();
        let options = RunOptions {
            dry_run: false,
            verbose: true,
        };

        let mut repo = repository();
        repo.is_archived = true;
        let result = check_eligibility(&host, &repo, options).await;
        assert_eq!(result, Ok(Eligibility::Ineligible(SkipReason::Archived)));

        assert!(host.calls().is_empty());
        assert!(logs.events().is_empty());
    }

    #[tokio::test]
    async fn wrong_language_logs_once_when_verbose() {
        let host = FakeHost::new();
        let mut repo = repository();
        repo.primary_language = Some("Rust".into());

        let logs = capture_logs();
        let verbose = RunOptions {
            dry_run: false,
            verbose: true,
        };
        let result = check_eligibility(&host, &repo, verbose).await;
        assert!(matches!(
            result,
            Ok(Eligibility::Ineligible(SkipReason::Language { .. }))
        ));
        let events = logs.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::INFO);
        assert_eq!(events[0].field("change"), Some("false"));
        assert_eq!(events[0].field("lang"), Some("Some(\"rust\")"));
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn wrong_language_is_silent_without_verbose() {
        let host = FakeHost::new();
        let mut repo = repository();
        repo.primary_language = None;

        let logs = capture_logs();
        let _ = check_eligibility(&host, &repo, RunOptions::default()).await;
        assert!(logs.events().is_empty());
    }

    #[tokio::test]
    async fn lerna_repository_is_skipped() {
        let host = FakeHost::new().with_probe(Probe::Present);
        let logs = capture_logs();
        let verbose = RunOptions {
            dry_run: false,
            verbose: true,
        };

        let result = check_eligibility(&host, &repository(), verbose).await;
        assert_eq!(
            result,
            Ok(Eligibility::Ineligible(SkipReason::Monorepo {
                manifest: "lerna.json".into()
            }))
        );
        let events = logs.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::WARN);
    }

    #[tokio::test]
    async fn probe_failure_is_not_mistaken_for_absence() {
        let failure = HostingError::Api {
            status: 502,
            message: "Bad Gateway".into(),
            errors: vec![],
        };
        let host = FakeHost::new().with_probe(Probe::Fails(failure.clone()));

        let result = check_eligibility(&host, &repository(), RunOptions::default()).await;
        assert_eq!(
            result,
            Err(RunError::EligibilityProbe {
                path: "lerna.json".into(),
                source: failure,
            })
        );
    }
}
