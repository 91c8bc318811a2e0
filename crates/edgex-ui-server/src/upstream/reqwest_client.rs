//! `reqwest`-backed transport.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use super::{Method, RequestBody, Upstream, UpstreamError, UpstreamRequest, UpstreamResponse};

/// Production transport sharing one connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestUpstream {
    client: reqwest::Client,
}

impl ReqwestUpstream {
    /// Builds a client with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Client`] if the TLS backend cannot be
    /// initialised.
    pub fn new() -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| UpstreamError::Client(error.to_string()))?;
        Ok(Self { client })
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
        }
    }
}

#[async_trait]
impl Upstream for ReqwestUpstream {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        let UpstreamRequest {
            method,
            url,
            body,
            timeout,
        } = request;
        let transport = |error: reqwest::Error| UpstreamError::Transport {
            url: url.clone(),
            message: error.to_string(),
        };

        let mut builder = self.client.request(method.into(), &url);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(json) => builder.json(&json),
            RequestBody::File(file) => {
                let part = Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.content_type)
                    .map_err(transport)?;
                builder.multipart(Form::new().part(file.field, part))
            }
        };

        let response = builder.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport)?;
        Ok(UpstreamResponse { status, body })
    }
}
