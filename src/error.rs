//! Error types surfaced by a check.

use std::num::ParseIntError;

use thiserror::Error;

/// Errors that abort a check. None of them are retried; a single failure
/// fails the whole invocation.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The GitHub client could not be built from the source configuration.
    #[error("failed to construct GitHub client: {message}")]
    ClientConstruction {
        /// What was wrong with the repository, token or endpoint.
        message: String,
    },

    /// A remote call to GitHub failed.
    #[error("{operation} failed: {message}")]
    Transport {
        /// The remote operation that was attempted.
        operation: String,
        /// Detail reported by the transport or by GitHub.
        message: String,
    },

    /// The previous version reference is not a comment identifier.
    #[error("could not parse comment ID '{reference}': {source}")]
    InvalidCheckpoint {
        reference: String,
        #[source]
        source: ParseIntError,
    },

    /// The comment named by the previous version could not be fetched.
    #[error("could not fetch last comment {id}: {cause}")]
    CheckpointNotFound {
        id: i64,
        #[source]
        cause: Box<CheckError>,
    },
}

impl CheckError {
    pub fn transport(operation: impl Into<String>, message: impl Into<String>) -> Self {
        CheckError::Transport {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn client_construction(message: impl Into<String>) -> Self {
        CheckError::ClientConstruction {
            message: message.into(),
        }
    }
}
