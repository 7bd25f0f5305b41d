//! HTTP transport shared by the REST and GraphQL calls.

use std::time::Duration;

use domain::HostingError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";

/// Connection settings for [`GithubClient`].
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// REST base URL, without trailing slash.
    pub api_url: String,
    /// GraphQL endpoint; see [`default_graphql_url`] when unset.
    pub graphql_url: Option<String>,
    /// Token sent as `Authorization: Bearer`.
    pub token: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl GithubConfig {
    /// Settings for github.com with a 30 second timeout.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            graphql_url: None,
            token: token.into(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("replace-node-ci/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

/// Errors building a [`GithubClient`].
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// The token contains characters not allowed in a header.
    #[error("token is not a valid header value")]
    InvalidToken,

    /// The REST base URL cannot be parsed or cannot carry a path.
    #[error("invalid API URL '{0}'")]
    InvalidApiUrl(String),

    /// The user agent contains characters not allowed in a header.
    #[error("user agent is not a valid header value")]
    InvalidUserAgent,

    /// The underlying HTTP client could not be created.
    #[error("HTTP client could not be built: {0}")]
    Http(#[from] reqwest::Error),
}

/// Authenticated GitHub API client.
///
/// Implements [`domain::CodeRepository`] and [`domain::PullRequestManager`].
#[derive(Debug, Clone)]
pub struct GithubClient {
    pub(crate) http: reqwest::Client,
    pub(crate) api_url: Url,
    pub(crate) graphql_url: String,
}

#[derive(Deserialize)]
struct RestErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<Value>,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
}

#[derive(Deserialize)]
struct GraphQlErrorEntry {
    message: String,
}

impl GithubClient {
    /// Builds a client from `config`.
    pub fn new(config: GithubConfig) -> Result<Self, ClientBuildError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| ClientBuildError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|_| ClientBuildError::InvalidUserAgent)?;

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .timeout(config.timeout)
            .build()?;

        let graphql_url = config
            .graphql_url
            .unwrap_or_else(|| default_graphql_url(&config.api_url));
        let api_url = Url::parse(&config.api_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ClientBuildError::InvalidApiUrl(config.api_url.clone()))?;

        Ok(Self {
            http,
            api_url,
            graphql_url,
        })
    }

    /// Appends `segments` to the REST base URL.
    ///
    /// Each segment is split on `/` and every piece is percent-encoded, so
    /// `feature/x` stays two path segments while `#`, `%` and `?` never leak
    /// into the fragment or query.
    pub(crate) fn rest_url(&self, segments: &[&str]) -> Result<Url, HostingError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| HostingError::InvalidResponse {
                message: format!("API URL '{}' cannot carry a path", self.api_url),
            })?
            .pop_if_empty()
            .extend(segments.iter().flat_map(|segment| segment.split('/')));
        Ok(url)
    }

    /// Issues `GET {api_url}/{segments..}`; 404 becomes [`HostingError::NotFound`].
    pub(crate) async fn rest_get(
        &self,
        segments: &[&str],
        resource: &str,
    ) -> Result<Response, HostingError> {
        let url = self.rest_url(segments)?;
        tracing::debug!(%url, "GET");

        let response = self.http.get(url).send().await.map_err(transport)?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(HostingError::NotFound {
                resource: resource.to_owned(),
            }),
            status if status.is_success() => Ok(response),
            status => Err(api_error(status, response).await),
        }
    }

    /// Issues a REST `GET` and decodes the JSON body.
    pub(crate) async fn rest_get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        resource: &str,
    ) -> Result<T, HostingError> {
        self.rest_get(segments, resource)
            .await?
            .json::<T>()
            .await
            .map_err(invalid_response)
    }

    /// Posts a GraphQL document and returns its `data`.
    ///
    /// A non-empty `errors` list wins over any partial `data`.
    pub(crate) async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, HostingError> {
        tracing::debug!(url = %self.graphql_url, "POST graphql");

        let response = self
            .http
            .post(&self.graphql_url)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status, response).await);
        }

        let body: GraphQlResponse<T> = response.json().await.map_err(invalid_response)?;
        if !body.errors.is_empty() {
            return Err(HostingError::GraphQl {
                errors: body.errors.into_iter().map(|e| e.message).collect(),
            });
        }
        body.data.ok_or_else(|| HostingError::InvalidResponse {
            message: "GraphQL response carried neither data nor errors".into(),
        })
    }
}

/// GraphQL endpoint implied by a REST base URL.
///
/// GitHub Enterprise Server serves REST under `/api/v3` and GraphQL under
/// `/api/graphql`; elsewhere GraphQL sits at `{api_url}/graphql`.
pub fn default_graphql_url(api_url: &str) -> String {
    let api_url = api_url.trim_end_matches('/');
    match api_url.strip_suffix("/api/v3") {
        Some(host) => format!("{host}/api/graphql"),
        None => format!("{api_url}/graphql"),
    }
}

fn transport(err: reqwest::Error) -> HostingError {
    HostingError::Transport {
        message: err.to_string(),
    }
}

fn invalid_response(err: reqwest::Error) -> HostingError {
    HostingError::InvalidResponse {
        message: err.to_string(),
    }
}

/// Converts a failed response into [`HostingError::Api`].
///
/// REST `errors` entries are either strings or objects with a `message`
/// (falling back to `code`).
async fn api_error(status: StatusCode, response: Response) -> HostingError {
    let text = response.text().await.unwrap_or_default();
    let (message, errors) = match serde_json::from_str::<RestErrorBody>(&text) {
        Ok(body) => {
            let errors = body
                .errors
                .iter()
                .filter_map(|entry| match entry {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(o) => o
                        .get("message")
                        .or_else(|| o.get("code"))
                        .and_then(Value::as_str)
                        .map(str::to_owned),
                    _ => None,
                })
                .collect();
            (body.message, errors)
        }
        Err(_) => (text, Vec::new()),
    };

    let message = if message.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_owned()
    } else {
        message
    };

    HostingError::Api {
        status: status.as_u16(),
        message,
        errors,
    }
}
