//! Error types for the runmeta metadata store
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use thiserror::Error;

/// Result type alias for runmeta operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the runmeta metadata store
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed document (bad structured markup or undecodable metadata)
    #[error("document format error: {0}")]
    Format(String),

    /// Malformed merge patch (not a flat JSON object of dotted paths)
    #[error("patch error: {0}")]
    Patch(String),

    /// Stored path does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Backend failure, carrying the backend's own status code verbatim
    #[error("backend error (status {status}): {message}")]
    Backend {
        /// Status code reported by the backend
        status: u16,
        /// Backend error message
        message: String,
    },

    /// Malformed request parameter
    #[error("invalid parameter {name}: {value:?}")]
    InvalidParam {
        /// Parameter name
        name: &'static str,
        /// The value that failed to parse
        value: String,
    },

    /// Batch deletion completed with per-item failures
    #[error("batch delete: {failed} of {total} items failed; first: {first}")]
    BatchDelete {
        /// Items matched by the query
        total: usize,
        /// Items whose deletion failed
        failed: usize,
        /// First per-item error encountered
        #[source]
        first: Box<Error>,
    },
}

impl Error {
    /// Backend error with a status code
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Error::Backend {
            status,
            message: message.into(),
        }
    }

    /// Status code the routing layer should answer with
    ///
    /// Local recoverable failures map to 400, missing paths to 404, and
    /// backend failures carry the backend's status through verbatim.
    pub fn status(&self) -> u16 {
        match self {
            Error::Format(_) | Error::Patch(_) | Error::InvalidParam { .. } => 400,
            Error::NotFound(_) => 404,
            Error::Backend { status, .. } => *status,
            Error::BatchDelete { first, .. } => first.status(),
        }
    }

    /// True if this is a missing-path error (listings map it to an empty result)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Format(e.to_string())
    }
}
