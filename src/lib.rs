//! Check step of a CI resource that turns GitHub pull request comments into
//! versions.
//!
//! Lists the pull requests of a repository, filters them and their
//! comments according to a [`Source`], takes the latest qualifying comment
//! of each pull request, and reports the comment ids newer than a
//! previously recorded [`Version`].

pub mod check;
pub mod cli;
pub mod error;
pub mod filter;
pub mod github;
pub mod types;

pub use check::{check, check_repository, latest_qualifying_comment};
pub use cli::{Command, parse_args, read_check_request, write_check_response};
pub use error::CheckError;
pub use github::GitHub;
pub use types::{
    CheckRequest, CheckResponse, Comment, Forge, PullRequest, Repo, RepoError, Source, Version,
};
