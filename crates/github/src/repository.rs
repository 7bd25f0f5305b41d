//! [`CodeRepository`] over the REST API (reads) and GraphQL API (writes).

use async_trait::async_trait;
use domain::{
    BranchName, CodeRepository, CommitOid, CommitRequest, HostingError, NodeId,
    RepositoryDescriptor, RepositoryName, RepositoryNwo, RepositoryOwner,
};
use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::GithubClient;

const CREATE_REF: &str = r#"mutation ($repositoryId: ID!, $name: String!, $oid: GitObjectID!) {
  createRef(input: {repositoryId: $repositoryId, name: $name, oid: $oid}) {
    clientMutationId
  }
}"#;

const CREATE_COMMIT_ON_BRANCH: &str = r#"mutation ($input: CreateCommitOnBranchInput!) {
  createCommitOnBranch(input: $input) {
    commit {
      oid
    }
  }
}"#;

#[derive(Deserialize)]
struct RepositoryResponse {
    node_id: String,
    name: String,
    owner: OwnerResponse,
    default_branch: String,
    private: bool,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    disabled: bool,
    #[serde(default)]
    fork: bool,
    language: Option<String>,
    #[serde(default)]
    size: u64,
}

#[derive(Deserialize)]
struct OwnerResponse {
    login: String,
}

#[derive(Deserialize)]
struct RefResponse {
    object: RefObject,
}

#[derive(Deserialize)]
struct RefObject {
    sha: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCommitData {
    create_commit_on_branch: CreateCommitPayload,
}

#[derive(Deserialize)]
struct CreateCommitPayload {
    commit: CommitNode,
}

#[derive(Deserialize)]
struct CommitNode {
    oid: String,
}

fn missing(field: &str) -> HostingError {
    HostingError::InvalidResponse {
        message: format!("repository response has an empty '{field}'"),
    }
}

impl TryFrom<RepositoryResponse> for RepositoryDescriptor {
    type Error = HostingError;

    fn try_from(r: RepositoryResponse) -> Result<Self, Self::Error> {
        let owner = RepositoryOwner::new(r.owner.login).ok_or_else(|| missing("owner.login"))?;
        let name = RepositoryName::new(r.name).ok_or_else(|| missing("name"))?;
        Ok(Self {
            id: NodeId::new(r.node_id).ok_or_else(|| missing("node_id"))?,
            nwo: RepositoryNwo::new(owner, name),
            default_branch: BranchName::new(r.default_branch)
                .ok_or_else(|| missing("default_branch"))?,
            is_private: r.private,
            is_archived: r.archived,
            is_disabled: r.disabled,
            is_fork: r.fork,
            primary_language: r.language,
            size_kb: r.size,
        })
    }
}

#[async_trait]
impl CodeRepository for GithubClient {
    #[instrument(skip_all, fields(nwo = %nwo))]
    async fn get_repository(
        &self,
        nwo: &RepositoryNwo,
    ) -> Result<RepositoryDescriptor, HostingError> {
        let response: RepositoryResponse = self
            .rest_get_json(
                &["repos", nwo.owner.as_str(), nwo.name.as_str()],
                &format!("repository {nwo}"),
            )
            .await?;
        response.try_into()
    }

    #[instrument(skip_all, fields(nwo = %nwo, path = %path))]
    async fn file_exists(&self, nwo: &RepositoryNwo, path: &str) -> Result<bool, HostingError> {
        let result = self
            .rest_get(
                &["repos", nwo.owner.as_str(), nwo.name.as_str(), "contents", path],
                &format!("{nwo}:{path}"),
            )
            .await;
        match result {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    #[instrument(skip_all, fields(nwo = %nwo, branch = %branch))]
    async fn get_branch_head(
        &self,
        nwo: &RepositoryNwo,
        branch: &BranchName,
    ) -> Result<CommitOid, HostingError> {
        let response: RefResponse = self
            .rest_get_json(
                &[
                    "repos",
                    nwo.owner.as_str(),
                    nwo.name.as_str(),
                    "git/ref/heads",
                    branch.as_str(),
                ],
                &format!("branch {branch} of {nwo}"),
            )
            .await?;
        Ok(CommitOid::parse(&response.object.sha)?)
    }

    #[instrument(skip_all, fields(branch = %branch, oid = %oid))]
    async fn create_ref(
        &self,
        repository_id: &NodeId,
        branch: &BranchName,
        oid: &CommitOid,
    ) -> Result<(), HostingError> {
        let _: IgnoredAny = self
            .graphql(
                CREATE_REF,
                json!({
                    "repositoryId": repository_id.as_str(),
                    "name": branch.qualified(),
                    "oid": oid.as_str(),
                }),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip_all, fields(nwo = %request.nwo, branch = %request.branch))]
    async fn create_commit_on_branch(
        &self,
        request: &CommitRequest,
    ) -> Result<CommitOid, HostingError> {
        let additions: Vec<_> = request
            .additions
            .iter()
            .map(|change| json!({ "path": change.path, "contents": change.contents_base64 }))
            .collect();

        let input = json!({
            "branch": {
                "repositoryNameWithOwner": request.nwo.to_string(),
                "branchName": request.branch.as_str(),
            },
            "expectedHeadOid": request.expected_head_oid.as_str(),
            "message": {
                "headline": request.headline,
                "body": request.body,
            },
            "fileChanges": { "additions": additions },
        });

        let data: CreateCommitData = self
            .graphql(CREATE_COMMIT_ON_BRANCH, json!({ "input": input }))
            .await?;
        Ok(CommitOid::parse(&data.create_commit_on_branch.commit.oid)?)
    }
}
