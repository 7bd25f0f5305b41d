//! Stage 4: render the workflows and commit them to the workflow branch.

use domain::{
    build_file_change_list, BranchName, CodeRepository, CommitOid, CommitRequest, RenderContext,
    RenderedWorkflow, RepositoryDescriptor, RunError, RunOptions, StageResult, TemplateRenderer,
    WorkflowFile, CHANGE_BODY, CHANGE_TITLE,
};

/// Renders every managed workflow against `context`.
pub fn render_workflows<T>(
    templates: &T,
    context: &RenderContext,
) -> Result<Vec<RenderedWorkflow>, RunError>
where
    T: TemplateRenderer + ?Sized,
{
    WorkflowFile::ALL
        .into_iter()
        .map(|file| {
            let name = file.template_name();
            templates
                .render(name, context)
                .map(|text| RenderedWorkflow { file, text })
                .map_err(|source| RunError::Render {
                    template: name.to_owned(),
                    source,
                })
        })
        .collect()
}

/// Renders, encodes, and submits the workflow commit; skipped on a dry run.
///
/// The commit expects `branch` to still point at `oid`. Every failure here is
/// fatal: without the commit there is nothing for a pull request to show.
pub async fn compose_and_commit<C, T>(
    client: &C,
    templates: &T,
    repository: &RepositoryDescriptor,
    branch: &BranchName,
    oid: &CommitOid,
    options: RunOptions,
) -> StageResult<CommitOid>
where
    C: CodeRepository + ?Sized,
    T: TemplateRenderer + ?Sized,
{
    if options.dry_run {
        return StageResult::Skipped;
    }

    let result = commit(client, templates, repository, branch, oid).await;
    match result {
        Ok(commit) => {
            tracing::debug!(sha = commit.short(), "workflows committed");
            StageResult::Completed(commit)
        }
        Err(err) => {
            tracing::error!(change = false, error = %err, "{}", err.detail());
            StageResult::Fatal(err)
        }
    }
}

async fn commit<C, T>(
    client: &C,
    templates: &T,
    repository: &RepositoryDescriptor,
    branch: &BranchName,
    oid: &CommitOid,
) -> Result<CommitOid, RunError>
where
    C: CodeRepository + ?Sized,
    T: TemplateRenderer + ?Sized,
{
    let rendered = render_workflows(templates, &RenderContext::for_repository(repository))?;

    let request = CommitRequest {
        nwo: repository.nwo.clone(),
        branch: branch.clone(),
        expected_head_oid: oid.clone(),
        headline: CHANGE_TITLE.to_owned(),
        body: CHANGE_BODY.to_owned(),
        additions: build_file_change_list(repository.is_private, &rendered),
    };

    client
        .create_commit_on_branch(&request)
        .await
        .map_err(|source| RunError::Commit {
            branch: branch.clone(),
            source,
        })
}
