//! Error types for batch decoding and handler failures.
//!
//! [`DispatchError`] covers requests the gateway cannot interpret at all and
//! maps to `400 Bad Request`. [`HandlerError`] is raised by an individual
//! operation while the batch runs and maps to `502 Bad Gateway`.

use edgex_transit::TransitError;
use thiserror::Error;

use crate::credentials::CredentialError;
use crate::upstream::UpstreamError;

/// Errors surfaced while turning a request body into operations.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The body is not valid Transit.
    #[error("malformed transit: {0}")]
    Transit(#[from] TransitError),

    /// The top-level value is not a vector of operations.
    #[error("batch must be a vector of operations, found {found}")]
    NotABatch { found: &'static str },

    /// The batch holds no operations.
    #[error("batch contains no operations")]
    EmptyBatch,

    /// An entry does not match any supported operation shape.
    #[error("unsupported operation at index {index}: {message}")]
    UnsupportedOperation { index: usize, message: String },
}

impl DispatchError {
    /// Creates an unsupported-operation error.
    pub fn unsupported(index: usize, message: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            index,
            message: message.into(),
        }
    }
}

/// Errors raised by query and mutation handlers.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A downstream EdgeX service call failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// An argument was missing or had the wrong type.
    #[error("invalid argument '{name}': {message}")]
    InvalidArgument { name: String, message: String },

    /// The shared password gate rejected the request.
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    /// A previously uploaded file could not be used.
    #[error("upload {file_id} unavailable: {source}")]
    Upload {
        file_id: u64,
        #[source]
        source: std::io::Error,
    },
}

impl HandlerError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
    }
}
