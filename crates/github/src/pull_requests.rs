//! [`PullRequestManager`] over the GraphQL API.

use async_trait::async_trait;
use domain::{HostingError, PullRequestManager, PullRequestRequest, PullRequestUrl};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::GithubClient;

const CREATE_PULL_REQUEST: &str = r#"mutation ($repositoryId: ID!, $base: String!, $head: String!, $title: String!, $body: String!) {
  createPullRequest(input: {repositoryId: $repositoryId, baseRefName: $base, headRefName: $head, title: $title, body: $body}) {
    pullRequest {
      url
    }
  }
}"#;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePullRequestData {
    create_pull_request: CreatePullRequestPayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePullRequestPayload {
    pull_request: PullRequestNode,
}

#[derive(Deserialize)]
struct PullRequestNode {
    url: String,
}

#[async_trait]
impl PullRequestManager for GithubClient {
    #[instrument(skip_all, fields(base = %request.base, head = %request.head))]
    async fn create_pull_request(
        &self,
        request: &PullRequestRequest,
    ) -> Result<PullRequestUrl, HostingError> {
        let data: CreatePullRequestData = self
            .graphql(
                CREATE_PULL_REQUEST,
                json!({
                    "repositoryId": request.repository_id.as_str(),
                    "base": request.base.as_str(),
                    "head": request.head.as_str(),
                    "title": request.title,
                    "body": request.body,
                }),
            )
            .await?;

        PullRequestUrl::new(data.create_pull_request.pull_request.url).ok_or_else(|| {
            HostingError::InvalidResponse {
                message: "pull request url is empty".into(),
            }
        })
    }
}
