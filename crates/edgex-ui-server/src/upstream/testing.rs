//! In-memory [`Upstream`] double.
//!
//! Responses are scripted per `(method, url)`; a responder closure can be
//! installed for URLs whose content depends on the request. Unscripted
//! requests receive `404`. Every request is recorded.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::{Method, Upstream, UpstreamError, UpstreamRequest, UpstreamResponse};

type Responder = Box<dyn Fn(&UpstreamRequest) -> Option<UpstreamResponse> + Send + Sync>;

/// Scripted transport for tests.
#[derive(Default)]
pub struct FakeUpstream {
    fixed: Mutex<HashMap<(Method, String), UpstreamResponse>>,
    responders: Mutex<Vec<Responder>>,
    failures: Mutex<HashMap<(Method, String), String>>,
    requests: Mutex<Vec<UpstreamRequest>>,
}

impl FakeUpstream {
    /// Creates a double with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a fixed response.
    pub fn respond(&self, method: Method, url: &str, status: u16, body: impl Into<Bytes>) {
        if let Ok(mut fixed) = self.fixed.lock() {
            fixed.insert((method, url.to_owned()), UpstreamResponse::new(status, body));
        }
    }

    /// Scripts a `200` JSON response.
    pub fn respond_json(&self, method: Method, url: &str, body: &serde_json::Value) {
        self.respond(method, url, 200, body.to_string());
    }

    /// Installs a responder consulted when no fixed response matches.
    pub fn respond_with<F>(&self, responder: F)
    where
        F: Fn(&UpstreamRequest) -> Option<UpstreamResponse> + Send + Sync + 'static,
    {
        if let Ok(mut responders) = self.responders.lock() {
            responders.push(Box::new(responder));
        }
    }

    /// Makes a request fail at the transport level.
    pub fn fail(&self, method: Method, url: &str, message: &str) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert((method, url.to_owned()), message.to_owned());
        }
    }

    /// Requests received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// `(method, url)` pairs received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<(Method, String)> {
        self.requests()
            .into_iter()
            .map(|request| (request.method, request.url))
            .collect()
    }

    fn lookup(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        let key = (request.method, request.url.clone());
        if let Some(message) = self
            .failures
            .lock()
            .ok()
            .and_then(|failures| failures.get(&key).cloned())
        {
            return Err(UpstreamError::Transport {
                url: request.url.clone(),
                message,
            });
        }
        if let Some(response) = self
            .fixed
            .lock()
            .ok()
            .and_then(|fixed| fixed.get(&key).cloned())
        {
            return Ok(response);
        }
        let scripted = self.responders.lock().ok().and_then(|responders| {
            responders
                .iter()
                .find_map(|responder| responder(request))
        });
        Ok(scripted.unwrap_or_else(|| UpstreamResponse::new(404, "not scripted")))
    }
}

#[async_trait]
impl Upstream for FakeUpstream {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        let response = self.lookup(&request);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        response
    }
}
