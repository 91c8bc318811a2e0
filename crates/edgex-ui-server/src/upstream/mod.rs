//! HTTP access to the downstream EdgeX services.
//!
//! Handlers talk to [`Downstream`], which wraps an [`Upstream`] transport and
//! turns non-success statuses into [`UpstreamError::Status`]. The transport
//! trait keeps handlers testable without a network.

mod reqwest_client;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub use reqwest_client::ReqwestUpstream;

const UPSTREAM_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::upstream");

/// HTTP verbs used against EdgeX.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    /// `GET`.
    Get,
    /// `POST`.
    Post,
    /// `PUT`.
    Put,
    /// `DELETE`.
    Delete,
}

/// File sent as a single-part multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Form field name.
    pub field: String,
    /// File name reported to the server.
    pub file_name: String,
    /// MIME type of the part.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Request body variants.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// JSON document.
    Json(serde_json::Value),
    /// Multipart upload.
    File(FilePart),
}

/// One outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    /// Verb.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Body.
    pub body: RequestBody,
    /// Per-request timeout.
    pub timeout: Option<Duration>,
}

/// Raw response as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Bytes,
}

impl UpstreamResponse {
    /// Builds a response from a status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures talking to a downstream service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The request could not be sent or the response not read.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The service answered with a non-success status.
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: Method,
        url: String,
        status: u16,
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },

    /// A request body could not be serialised.
    #[error("failed to encode request body for {url}: {message}")]
    Encode { url: String, message: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl UpstreamError {
    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            url: url.into(),
            message: message.into(),
        }
    }
}

/// Transport used to reach downstream services.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Sends one request and returns the raw response, whatever its status.
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError>;
}

/// Destination of a downstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Absolute URL.
    pub url: String,
    /// Timeout configured for the owning service.
    pub timeout: Option<Duration>,
}

/// Convenience layer over an [`Upstream`] used by handlers.
#[derive(Clone)]
pub struct Downstream {
    upstream: Arc<dyn Upstream>,
}

impl Downstream {
    /// Wraps a transport.
    #[must_use]
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self { upstream }
    }

    /// `GET` returning a JSON document; an empty body yields `null`.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, non-2xx statuses and invalid JSON.
    pub async fn get_json(&self, target: Target) -> Result<serde_json::Value, UpstreamError> {
        let url = target.url.clone();
        let body = self.execute(Method::Get, target, RequestBody::Empty).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(&body).map_err(|error| UpstreamError::decode(url, error.to_string()))
    }

    /// `GET` returning the body as text.
    ///
    /// # Errors
    ///
    /// Fails on transport errors and non-2xx statuses.
    pub async fn get_text(&self, target: Target) -> Result<String, UpstreamError> {
        let body = self.execute(Method::Get, target, RequestBody::Empty).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// `POST` of a JSON body; returns the response text, which EdgeX uses
    /// for the id of the created entity.
    ///
    /// # Errors
    ///
    /// Fails on serialisation errors, transport errors and non-2xx statuses.
    pub async fn post_json<T>(&self, target: Target, body: &T) -> Result<String, UpstreamError>
    where
        T: Serialize + Sync,
    {
        let body = json_body(&target.url, body)?;
        let response = self.execute(Method::Post, target, body).await?;
        Ok(String::from_utf8_lossy(&response).trim().to_owned())
    }

    /// `PUT` of a JSON body.
    ///
    /// # Errors
    ///
    /// Fails on serialisation errors, transport errors and non-2xx statuses.
    pub async fn put_json<T>(&self, target: Target, body: &T) -> Result<(), UpstreamError>
    where
        T: Serialize + Sync,
    {
        let body = json_body(&target.url, body)?;
        self.execute(Method::Put, target, body).await.map(drop)
    }

    /// `PUT` without a body.
    ///
    /// # Errors
    ///
    /// Fails on transport errors and non-2xx statuses.
    pub async fn put(&self, target: Target) -> Result<(), UpstreamError> {
        self.execute(Method::Put, target, RequestBody::Empty)
            .await
            .map(drop)
    }

    /// `DELETE`.
    ///
    /// # Errors
    ///
    /// Fails on transport errors and non-2xx statuses.
    pub async fn delete(&self, target: Target) -> Result<(), UpstreamError> {
        self.execute(Method::Delete, target, RequestBody::Empty)
            .await
            .map(drop)
    }

    /// `POST` of a multipart file upload.
    ///
    /// # Errors
    ///
    /// Fails on transport errors and non-2xx statuses.
    pub async fn post_file(&self, target: Target, file: FilePart) -> Result<(), UpstreamError> {
        self.execute(Method::Post, target, RequestBody::File(file))
            .await
            .map(drop)
    }

    async fn execute(
        &self,
        method: Method,
        target: Target,
        body: RequestBody,
    ) -> Result<Bytes, UpstreamError> {
        let Target { url, timeout } = target;
        debug!(target: UPSTREAM_TARGET, %method, %url, "sending downstream request");
        let response = self
            .upstream
            .send(UpstreamRequest {
                method,
                url: url.clone(),
                body,
                timeout,
            })
            .await?;
        if !response.is_success() {
            return Err(UpstreamError::Status {
                method,
                url,
                status: response.status,
                body: String::from_utf8_lossy(&response.body).trim().to_owned(),
            });
        }
        Ok(response.body)
    }
}

impl std::fmt::Debug for Downstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Downstream").finish_non_exhaustive()
    }
}

fn json_body<T: Serialize>(url: &str, body: &T) -> Result<RequestBody, UpstreamError> {
    serde_json::to_value(body)
        .map(RequestBody::Json)
        .map_err(|error| UpstreamError::Encode {
            url: url.to_owned(),
            message: error.to_string(),
        })
}
