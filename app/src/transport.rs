//! HTTP execution for the requests the core hands out.
//!
//! # Design
//! The core is sans-IO; this module is the host side of that boundary. The
//! `Transport` trait exists so the view can be exercised in tests with a
//! scripted fake instead of a network.

use std::time::Duration;

use todoq_core::{ApiError, HttpMethod, HttpRequest, HttpResponse};

/// Executes an `HttpRequest` and returns the raw `HttpResponse`.
///
/// Implementations must not interpret status codes — 4xx/5xx come back as
/// data so the core can map them to error variants itself. `Err` is reserved
/// for transport failures where no response was observed.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking ureq-backed transport.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// No retries; one overall timeout per request. A timed-out request
    /// surfaces as `ApiError::Transport` like any other I/O failure.
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(Duration::from_secs(10)))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => self.agent.get(&request.url).call(),
            (HttpMethod::Delete, _) => self.agent.delete(&request.url).call(),
            (HttpMethod::Post, Some(body)) => self
                .agent
                .post(&request.url)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Post, None) => self.agent.post(&request.url).send_empty(),
            (HttpMethod::Put, Some(body)) => self
                .agent
                .put(&request.url)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Put, None) => self.agent.put(&request.url).send_empty(),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}
