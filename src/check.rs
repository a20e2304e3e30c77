use tracing::debug;

use crate::{
    error::CheckError,
    github::GitHub,
    types::{CheckRequest, CheckResponse, Comment, Forge, PullRequest, Source, Version},
};

/// Builds a GitHub client from the request's source and runs [`check`].
pub async fn check_repository(request: &CheckRequest) -> Result<CheckResponse, CheckError> {
    let forge = GitHub::from_source(&request.source)?;
    check(request, &forge).await
}

/// Scans the repository and returns the versions newer than the request's
/// checkpoint.
///
/// Each qualifying pull request contributes its latest qualifying comment.
/// Without a checkpoint every candidate is emitted. With one, the
/// checkpoint itself is emitted together with every candidate whose id is
/// greater. The result is sorted by reference string, so `"10"` sorts
/// before `"9"`.
pub async fn check<F>(request: &CheckRequest, forge: &F) -> Result<CheckResponse, CheckError>
where
    F: Forge + Sync,
{
    let source = &request.source;
    let mut candidates = Vec::new();

    for pr in forge.list_pull_requests().await? {
        if !pull_request_qualifies(source, &pr, forge).await? {
            continue;
        }

        let comments = forge.list_pull_request_comments(pr.number).await?;
        if let Some(comment) = latest_qualifying_comment(source, comments) {
            debug!(pr = pr.number, comment = comment.id, "selected candidate comment");
            candidates.push(comment);
        }
    }

    let mut versions = match request.checkpoint() {
        None => candidates
            .iter()
            .map(|c| Version::from_comment_id(c.id))
            .collect::<CheckResponse>(),
        Some(reference) => versions_since(reference, &candidates, forge).await?,
    };

    // Lexicographic on purpose; consumers rely on this order.
    versions.sort_by(|a, b| a.reference.cmp(&b.reference));

    debug!(
        candidates = candidates.len(),
        versions = versions.len(),
        "check complete"
    );
    Ok(versions)
}

async fn pull_request_qualifies<F>(
    source: &Source,
    pr: &PullRequest,
    forge: &F,
) -> Result<bool, CheckError>
where
    F: Forge + Sync,
{
    if !source.requests_pull_request_state(pr) {
        debug!(pr = pr.number, state = %pr.state, "skipping: state not requested");
        return Ok(false);
    }

    if !source.requests_labels(&pr.labels) {
        debug!(pr = pr.number, "skipping: labels not requested");
        return Ok(false);
    }

    if source.only_mergeable {
        let mergeable = match pr.mergeable {
            Some(mergeable) => mergeable,
            None => forge
                .get_pull_request(pr.number)
                .await?
                .mergeable
                .unwrap_or(false),
        };
        if !mergeable {
            debug!(pr = pr.number, "skipping: not mergeable");
            return Ok(false);
        }
    }

    if pr.draft {
        debug!(pr = pr.number, "skipping: draft");
        return Ok(false);
    }

    Ok(true)
}

/// Picks the most recently created comment that passes the comment filters.
/// Equal timestamps resolve to the higher comment id.
pub fn latest_qualifying_comment(
    source: &Source,
    comments: impl IntoIterator<Item = Comment>,
) -> Option<Comment> {
    comments
        .into_iter()
        .filter(|c| source.requests_commenter_association(&c.author_association))
        .filter(|c| source.requests_comment_regex(&c.body))
        .max_by_key(|c| (c.created_at, c.id))
}

async fn versions_since<F>(
    reference: &str,
    candidates: &[Comment],
    forge: &F,
) -> Result<CheckResponse, CheckError>
where
    F: Forge + Sync,
{
    let id: i64 = reference
        .parse()
        .map_err(|source| CheckError::InvalidCheckpoint {
            reference: reference.to_string(),
            source,
        })?;

    let fetched = match u64::try_from(id) {
        Ok(comment_id) => forge.get_pull_request_comment(comment_id).await,
        Err(_) => Err(CheckError::transport(
            format!("get comment {id}"),
            "comment ids are never negative",
        )),
    };
    let last = fetched.map_err(|cause| CheckError::CheckpointNotFound {
        id,
        cause: Box::new(cause),
    })?;

    let mut versions = vec![Version::from_comment_id(last.id)];
    versions.extend(
        candidates
            .iter()
            .filter(|c| c.id > last.id)
            .map(|c| Version::from_comment_id(c.id)),
    );
    Ok(versions)
}
