use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::{Octocrab, Page};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::CheckError,
    types::{Comment, Forge, PullRequest, Repo, Source},
};

const PER_PAGE: u8 = 100;

/// Resolves the token to authenticate with, preferring the one configured
/// on the source over the environment.
pub fn get_github_token(source: &Source) -> Option<String> {
    source
        .access_token
        .clone()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| std::env::var("GITHUB_TOKEN").ok())
        .or_else(|| std::env::var("GH_TOKEN").ok())
        .filter(|t| !t.trim().is_empty())
}

/// Creates a GitHub client, authenticated when a token is available and
/// pointed at `endpoint` when one is given.
pub fn setup_github_client(
    token: Option<String>,
    endpoint: Option<&str>,
) -> Result<Octocrab, CheckError> {
    let mut builder = Octocrab::builder();

    if let Some(token) = token {
        builder = builder.personal_token(token);
    } else {
        debug!("no GitHub token available, using anonymous access");
    }

    if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
        let url = url::Url::parse(endpoint).map_err(|e| {
            CheckError::client_construction(format!("invalid github_endpoint '{endpoint}': {e}"))
        })?;
        let uri: http::Uri = url.as_str().parse().map_err(|e| {
            CheckError::client_construction(format!("invalid github_endpoint '{endpoint}': {e}"))
        })?;
        builder = builder
            .base_uri(uri)
            .map_err(|e| CheckError::client_construction(e.to_string()))?;
    }

    builder
        .build()
        .map_err(|e| CheckError::client_construction(e.to_string()))
}

fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> CheckError {
    match error {
        octocrab::Error::GitHub { source, .. } => CheckError::transport(
            operation,
            format!(
                "GitHub returned {status}: {message}",
                status = source.status_code,
                message = source.message
            ),
        ),
        other => CheckError::transport(operation, other.to_string()),
    }
}

#[derive(Debug, Serialize)]
struct ListParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'a str>,
    per_page: u8,
}

#[derive(Debug, Deserialize)]
struct ApiLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiPullRequest {
    number: u64,
    state: String,
    #[serde(default)]
    draft: Option<bool>,
    #[serde(default)]
    mergeable: Option<bool>,
    #[serde(default)]
    merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    labels: Vec<ApiLabel>,
}

impl From<ApiPullRequest> for PullRequest {
    fn from(pr: ApiPullRequest) -> Self {
        PullRequest {
            number: pr.number,
            state: pr.state,
            merged: pr.merged_at.is_some(),
            labels: pr.labels.into_iter().map(|l| l.name).collect(),
            mergeable: pr.mergeable,
            draft: pr.draft.unwrap_or(false),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiComment {
    id: u64,
    created_at: DateTime<Utc>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    author_association: Option<String>,
}

impl From<ApiComment> for Comment {
    fn from(comment: ApiComment) -> Self {
        Comment {
            id: comment.id,
            created_at: comment.created_at,
            body: comment.body.unwrap_or_default(),
            author_association: comment.author_association.unwrap_or_default(),
        }
    }
}

/// Forge backed by the GitHub REST API.
pub struct GitHub {
    client: Octocrab,
    repo: Repo,
    list_state: &'static str,
}

impl GitHub {
    pub fn new(client: Octocrab, repo: Repo, list_state: &'static str) -> Self {
        Self {
            client,
            repo,
            list_state,
        }
    }

    /// Builds a client for the repository and credentials named by `source`.
    pub fn from_source(source: &Source) -> Result<Self, CheckError> {
        let repo = Repo::parse(&source.repository)
            .map_err(|e| CheckError::client_construction(e.to_string()))?;

        if source.skip_ssl_verification {
            warn!("skip_ssl_verification is not supported; certificates will be verified");
        }

        let client =
            setup_github_client(get_github_token(source), source.github_endpoint.as_deref())?;

        Ok(Self::new(client, repo, list_state_for(&source.states)))
    }

    fn repo_path(&self) -> String {
        format!("/repos/{}/{}", self.repo.owner(), self.repo.name())
    }
}

/// Chooses the `state` to list pull requests with. Closed and merged pull
/// requests are only fetched when some configured state needs them.
pub fn list_state_for(states: &[String]) -> &'static str {
    if !states.is_empty() && states.iter().all(|s| s.eq_ignore_ascii_case("open")) {
        "open"
    } else {
        "all"
    }
}

#[async_trait]
impl Forge for GitHub {
    async fn list_pull_requests(&self) -> Result<Vec<PullRequest>, CheckError> {
        const OPERATION: &str = "list pull requests";
        let params = ListParams {
            state: Some(self.list_state),
            per_page: PER_PAGE,
        };
        let page = self
            .client
            .get::<Page<ApiPullRequest>, _, _>(format!("{}/pulls", self.repo_path()), Some(&params))
            .await
            .map_err(|e| map_octocrab_error(OPERATION, &e))?;

        let pulls = self
            .client
            .all_pages(page)
            .await
            .map_err(|e| map_octocrab_error(OPERATION, &e))?;

        debug!(repo = %self.repo, count = pulls.len(), "listed pull requests");
        Ok(pulls.into_iter().map(PullRequest::from).collect())
    }

    async fn list_pull_request_comments(&self, number: u64) -> Result<Vec<Comment>, CheckError> {
        let operation = format!("list comments for pull request #{number}");
        let params = ListParams {
            state: None,
            per_page: PER_PAGE,
        };
        let page = self
            .client
            .get::<Page<ApiComment>, _, _>(
                format!("{}/issues/{number}/comments", self.repo_path()),
                Some(&params),
            )
            .await
            .map_err(|e| map_octocrab_error(&operation, &e))?;

        self.client
            .all_pages(page)
            .await
            .map(|comments| comments.into_iter().map(Comment::from).collect())
            .map_err(|e| map_octocrab_error(&operation, &e))
    }

    async fn get_pull_request_comment(&self, id: u64) -> Result<Comment, CheckError> {
        self.client
            .get::<ApiComment, _, _>(
                format!("{}/issues/comments/{id}", self.repo_path()),
                None::<&()>,
            )
            .await
            .map(Comment::from)
            .map_err(|e| map_octocrab_error(&format!("get comment {id}"), &e))
    }

    async fn get_pull_request(&self, number: u64) -> Result<PullRequest, CheckError> {
        self.client
            .get::<ApiPullRequest, _, _>(
                format!("{}/pulls/{number}", self.repo_path()),
                None::<&()>,
            )
            .await
            .map(PullRequest::from)
            .map_err(|e| map_octocrab_error(&format!("get pull request #{number}"), &e))
    }
}
