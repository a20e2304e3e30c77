use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::error::CheckError;

// The pattern is compiled while decoding so that a bad expression is
// rejected together with the rest of the request.
fn deserialize_comment_regex<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Regex>, D::Error>
where
    D: Deserializer<'de>,
{
    let pattern = Option::<String>::deserialize(deserializer)?;
    pattern
        .filter(|p| !p.is_empty())
        .map(|p| Regex::new(&p).map_err(serde::de::Error::custom))
        .transpose()
}

/// Filter criteria for one check, decoded from the request's `source`.
///
/// Every collection defaults to empty, and an empty collection accepts
/// everything. Drafts are never configurable; they are always excluded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Source {
    /// Repository in `owner/name` form.
    pub repository: String,

    /// Personal access token. Falls back to `GITHUB_TOKEN` or `GH_TOKEN`.
    #[serde(default)]
    pub access_token: Option<String>,

    /// API base URL for GitHub Enterprise installations.
    #[serde(default)]
    pub github_endpoint: Option<String>,

    #[serde(default)]
    pub skip_ssl_verification: bool,

    /// Pull request states to consider: `open`, `closed`, `merged`.
    #[serde(default)]
    pub states: Vec<String>,

    /// A pull request qualifies if it carries any of these labels.
    #[serde(default)]
    pub labels: Vec<String>,

    #[serde(default)]
    pub only_mergeable: bool,

    /// Author associations accepted for comments, e.g. `collaborator`.
    #[serde(default)]
    pub commenter_association: Vec<String>,

    /// Pattern searched for anywhere in a comment body.
    #[serde(default, deserialize_with = "deserialize_comment_regex")]
    pub comment_regex: Option<Regex>,
}

/// An opaque version token: the decimal id of one qualifying comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Version {
    #[serde(rename = "ref", default)]
    pub reference: String,
}

impl Version {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
        }
    }

    pub fn from_comment_id(id: u64) -> Self {
        Self::new(id.to_string())
    }
}

/// Request read from stdin by the `check` entry point.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckRequest {
    pub source: Source,
    #[serde(default)]
    pub version: Option<Version>,
}

impl CheckRequest {
    pub fn new(source: Source, version: Option<Version>) -> Self {
        Self { source, version }
    }

    /// Returns the previous version reference, if one was recorded.
    pub fn checkpoint(&self) -> Option<&str> {
        self.version
            .as_ref()
            .map(|v| v.reference.as_str())
            .filter(|r| !r.is_empty())
    }
}

/// Versions written to stdout, sorted ascending by reference string.
pub type CheckResponse = Vec<Version>;

/// Identifies a GitHub repository by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repo {
    owner: String,
    name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    #[error("repository must be in format 'owner/repo', got: '{0}'")]
    InvalidFormat(String),
    #[error("repository owner must not be empty")]
    EmptyOwner,
    #[error("repository name must not be empty")]
    EmptyName,
}

impl Repo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self, RepoError> {
        let owner = owner.into();
        let name = name.into();
        if owner.trim().is_empty() {
            return Err(RepoError::EmptyOwner);
        }
        if name.trim().is_empty() {
            return Err(RepoError::EmptyName);
        }
        Ok(Self { owner, name })
    }

    /// Parses `owner/name`.
    pub fn parse(repo: &str) -> Result<Self, RepoError> {
        let parts: Vec<&str> = repo.trim().split('/').collect();
        if parts.len() != 2 {
            return Err(RepoError::InvalidFormat(repo.to_string()));
        }
        Self::new(parts[0], parts[1])
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Pull request as seen by the filters.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequest {
    pub number: u64,
    /// `open` or `closed`, as reported by GitHub.
    pub state: String,
    pub merged: bool,
    pub labels: Vec<String>,
    /// `None` when GitHub has not computed mergeability, which is always
    /// the case for list responses.
    pub mergeable: Option<bool>,
    pub draft: bool,
}

/// Issue comment on a pull request.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub body: String,
    pub author_association: String,
}

/// Read access to the repository being checked.
///
/// Implemented by [`crate::GitHub`] for the real API and by mocks in tests.
#[async_trait]
pub trait Forge {
    async fn list_pull_requests(&self) -> Result<Vec<PullRequest>, CheckError>;

    async fn list_pull_request_comments(&self, number: u64) -> Result<Vec<Comment>, CheckError>;

    /// Fetches one comment by its repository-wide id.
    async fn get_pull_request_comment(&self, id: u64) -> Result<Comment, CheckError>;

    /// Fetches a single pull request, including its mergeability.
    async fn get_pull_request(&self, number: u64) -> Result<PullRequest, CheckError>;
}
