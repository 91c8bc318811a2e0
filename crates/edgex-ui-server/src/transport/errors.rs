//! Request failures and their HTTP rendering.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use edgex_transit::TransitError;
use thiserror::Error;
use tracing::{error, warn};

use crate::dispatch::{DispatchError, error_container};

use super::{TRANSIT_CONTENT_TYPE, TRANSPORT_TARGET};

/// Errors raised before or after a batch runs.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request body could not be interpreted.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// A multipart upload was missing a part or could not be read.
    #[error("invalid upload: {0}")]
    Upload(String),

    /// Writing the uploaded file failed.
    #[error("failed to store upload: {0}")]
    Store(#[from] std::io::Error),

    /// The response could not be serialised.
    #[error("failed to encode response: {0}")]
    Encode(#[from] TransitError),
}

impl TransportError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Dispatch(_) | Self::Upload(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) | Self::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TransportError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            error!(target: TRANSPORT_TARGET, %status, error = %message, "request failed");
        } else {
            warn!(target: TRANSPORT_TARGET, %status, error = %message, "request rejected");
        }
        match edgex_transit::encode(&error_container(message.clone())) {
            Ok(body) => (status, [(header::CONTENT_TYPE, TRANSIT_CONTENT_TYPE)], body).into_response(),
            Err(_) => (status, message).into_response(),
        }
    }
}
