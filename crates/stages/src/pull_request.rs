//! Stage 5: open the pull request, or report what a dry run would have done.

use domain::{
    workflows_for, BranchName, CommitOid, DryRunReport, NodeId, PullRequestManager,
    PullRequestRequest, PullRequestUrl, RepositoryDescriptor, RunError, StageResult, CHANGE_BODY,
    CHANGE_TITLE,
};

/// Opens a pull request from `head` into `base`.
///
/// Failure is logged and returned as recoverable; this is the last stage, so
/// there is nothing left to gate.
pub async fn open_pull_request<C>(
    client: &C,
    repository_id: &NodeId,
    base: &BranchName,
    head: &BranchName,
) -> StageResult<PullRequestUrl>
where
    C: PullRequestManager + ?Sized,
{
    let request = PullRequestRequest {
        repository_id: repository_id.clone(),
        base: base.clone(),
        head: head.clone(),
        title: CHANGE_TITLE.to_owned(),
        body: CHANGE_BODY.to_owned(),
    };

    match client.create_pull_request(&request).await {
        Ok(url) => {
            tracing::info!(change = true, url = %url, "pull request created {url}");
            StageResult::Completed(url)
        }
        Err(source) => {
            let err = RunError::OpenPullRequest { source };
            tracing::error!(change = false, error = %err, "{}", err.detail());
            StageResult::Recoverable(err)
        }
    }
}

/// Logs the single dry-run record in place of opening a pull request.
pub fn simulate_pull_request(
    repository: &RepositoryDescriptor,
    branch: &BranchName,
    oid: &CommitOid,
) -> DryRunReport {
    let report = DryRunReport {
        owner: repository.nwo.owner.to_string(),
        repo: repository.nwo.name.to_string(),
        private: repository.is_private,
        head: repository.default_branch.clone(),
        base: branch.clone(),
        workflows: workflows_for(repository.is_private)
            .into_iter()
            .map(|file| file.path().to_owned())
            .collect(),
        sha: oid.short().to_owned(),
    };

    tracing::info!(
        change = false,
        owner = %report.owner,
        repo = %report.repo,
        private = report.private,
        head = %report.head,
        base = %report.base,
        workflows = ?report.workflows,
        sha = %report.sha,
        "[DRY RUN] pull request created"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{capture_logs, repository, Call, FakeHost, HEAD};
    use domain::HostingError;

    #[tokio::test]
    async fn opens_pull_request_into_default_branch() {
        let host = FakeHost::new();
        let repo = repository();
        let logs = capture_logs();

        let result = open_pull_request(
            &host,
            &repo.id,
            &repo.default_branch,
            &BranchName::pull_request_target(),
        )
        .await;

        let url = PullRequestUrl::new("https://github.com/stoe/demo/pull/1").unwrap();
        assert_eq!(result, StageResult::Completed(url));
        match host.calls().as_slice() {
            [Call::CreatePullRequest(request)] => {
                assert_eq!(request.base.as_str(), "main");
                assert_eq!(request.head.as_str(), "octoherd/replace-node-workflows");
                assert_eq!(request.title, CHANGE_TITLE);
                assert_eq!(
                    request.body,
                    "via [@stoe/octoherd-script-replace-node-ci](https://github.com/stoe/octoherd-script-replace-node-ci)"
                );
            }
            other => panic!("unexpected calls {other:?}"),
        }

        let events = logs.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].field("change"), Some("true"));
    }

    #[tokio::test]
    async fn failure_is_recoverable() {
        let host = FakeHost::new().with_pull_request_error(HostingError::GraphQl {
            errors: vec!["A pull request already exists for stoe:octoherd/replace-node-workflows.".into()],
        });
        let repo = repository();

        let result = open_pull_request(
            &host,
            &repo.id,
            &repo.default_branch,
            &BranchName::pull_request_target(),
        )
        .await;
        assert!(matches!(result, StageResult::Recoverable(RunError::OpenPullRequest { .. })));
    }

    #[test]
    fn dry_run_record_matches_scenario() {
        let logs = capture_logs();
        let report = simulate_pull_request(
            &repository(),
            &BranchName::pull_request_target(),
            &CommitOid::parse(HEAD).unwrap(),
        );

        assert_eq!(report.head.as_str(), "main");
        assert_eq!(report.base.as_str(), "octoherd/replace-node-workflows");
        assert_eq!(report.sha, "0123456");
        assert!(!report.private);
        assert_eq!(
            report.workflows,
            [
                ".github/workflows/codeql.yml",
                ".github/workflows/test.yml",
                ".github/workflows/publish.yml",
            ]
        );

        let events = logs.events();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.message(), "[DRY RUN] pull request created");
        assert_eq!(event.field("change"), Some("false"));
        assert_eq!(event.field("head"), Some("main"));
        assert_eq!(event.field("base"), Some("octoherd/replace-node-workflows"));
        assert_eq!(event.field("sha"), Some("0123456"));
    }

    #[test]
    fn dry_run_record_for_private_repository_lists_only_tests() {
        let mut repo = repository();
        repo.is_private = true;
        let report = simulate_pull_request(
            &repo,
            &BranchName::pull_request_target(),
            &CommitOid::parse(HEAD).unwrap(),
        );
        assert_eq!(report.workflows, [".github/workflows/test.yml"]);
    }
}
