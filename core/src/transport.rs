//! The only part of the crate that performs network I/O.
//!
//! # Design
//! `Transport` is the seam between the deterministic pipeline and the
//! network. [`UreqTransport`] is the default; hosts with their own HTTP stack
//! implement the trait instead. A transport returns `Ok` for every HTTP
//! status; interpreting the status is the decoder's job.

use std::time::Duration;

use crate::error::{Error, Result, TransportErrorKind};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Default upper bound for a single attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Executes a rendered request.
pub trait Transport: Send + Sync {
    /// Send `request`; `timeout` bounds the whole attempt when present.
    fn send(&self, request: &HttpRequest, timeout: Option<Duration>) -> Result<HttpResponse>;
}

/// Blocking transport backed by a shared `ureq::Agent`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    timeout: Duration,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent, timeout }
    }
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest, timeout: Option<Duration>) -> Result<HttpResponse> {
        let timeout = timeout.map_or(self.timeout, |t| t.min(self.timeout));
        let url = request.url.as_str();
        let body = request.body.as_deref().map(str::as_bytes);

        let result = match request.method {
            HttpMethod::Get => prepare(self.agent.get(url), request, timeout).call(),
            HttpMethod::Delete => prepare(self.agent.delete(url), request, timeout).call(),
            HttpMethod::Post => send_with_body(prepare(self.agent.post(url), request, timeout), body),
            HttpMethod::Put => send_with_body(prepare(self.agent.put(url), request, timeout), body),
            HttpMethod::Patch => {
                send_with_body(prepare(self.agent.patch(url), request, timeout), body)
            }
        };

        let mut response = result.map_err(transport_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(transport_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn prepare<B>(
    mut builder: ureq::RequestBuilder<B>,
    request: &HttpRequest,
    timeout: Duration,
) -> ureq::RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder.config().timeout_global(Some(timeout)).build()
}

fn send_with_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<&[u8]>,
) -> std::result::Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(bytes) => builder.send(bytes),
        None => builder.send_empty(),
    }
}

fn transport_error(err: ureq::Error) -> Error {
    let kind = match &err {
        ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
        ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => TransportErrorKind::Connect,
        ureq::Error::Io(io) if io.kind() == std::io::ErrorKind::ConnectionRefused => {
            TransportErrorKind::Connect
        }
        ureq::Error::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => {
            TransportErrorKind::Timeout
        }
        ureq::Error::Io(_) => TransportErrorKind::Io,
        _ => TransportErrorKind::Other,
    };
    Error::Transport {
        kind,
        message: err.to_string(),
    }
}
