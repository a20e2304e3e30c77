//! Predicates deciding whether pull requests and comments match a source.
//!
//! All of them are permissive by default: an empty set or a missing
//! pattern accepts everything.

use crate::types::{PullRequest, Source};

const MERGED_STATE: &str = "merged";

impl Source {
    /// Tests a raw state string against the configured states, ignoring
    /// ASCII case.
    pub fn requests_state(&self, state: &str) -> bool {
        self.states.is_empty() || self.states.iter().any(|s| s.eq_ignore_ascii_case(state))
    }

    /// Tests a pull request's state. A merged pull request is reported as
    /// `closed` by GitHub, so it also matches a configured `merged`.
    pub fn requests_pull_request_state(&self, pr: &PullRequest) -> bool {
        self.requests_state(&pr.state) || (pr.merged && self.requests_state(MERGED_STATE))
    }

    /// Match-any over labels, compared exactly.
    pub fn requests_labels(&self, labels: &[String]) -> bool {
        self.labels.is_empty() || labels.iter().any(|label| self.labels.contains(label))
    }

    pub fn requests_commenter_association(&self, association: &str) -> bool {
        self.commenter_association.is_empty()
            || self
                .commenter_association
                .iter()
                .any(|a| a.eq_ignore_ascii_case(association))
    }

    /// Unanchored search of the comment body.
    pub fn requests_comment_regex(&self, body: &str) -> bool {
        self.comment_regex
            .as_ref()
            .is_none_or(|pattern| pattern.is_match(body))
    }
}
