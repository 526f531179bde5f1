//! Shared client state and the request/response loop every operation uses.
//!
//! # Design
//! `BaseService` splits its state in two. The authenticator and transport
//! are behind `Arc` and shared by every clone. The URL, default headers and
//! retry policy are owned and copied on clone, so a clone can be re-pointed
//! without touching the original. Calls take `&self` and configuration
//! changes take `&mut self`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::auth::Authenticator;
use crate::config::{ConfigSource, ServiceConfig};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::http::set_header;
use crate::options::{Operation, Options};
use crate::request::parse_service_url;
use crate::response::{parse_response, DetailedResponse};
use crate::retry::{Decision, RetryPolicy};
use crate::transport::{Transport, UreqTransport};

/// Construction input for a `BaseService`.
#[derive(Debug, Clone, Default)]
pub struct ServiceOptions {
    /// `None` selects the module's default URL; `Some("")` is kept as-is
    /// and reported when a call is made.
    pub url: Option<String>,
    pub authenticator: Option<Arc<dyn Authenticator>>,
}

#[derive(Clone)]
pub struct BaseService {
    service_url: String,
    default_headers: Vec<(String, String)>,
    retry: Option<RetryPolicy>,
    authenticator: Arc<dyn Authenticator>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for BaseService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseService")
            .field("service_url", &self.service_url)
            .field("default_headers", &self.default_headers)
            .field("retry", &self.retry)
            .field("authenticator", &self.authenticator)
            .finish_non_exhaustive()
    }
}

impl BaseService {
    pub fn new(options: ServiceOptions, default_url: &str) -> Result<Self> {
        let authenticator = options
            .authenticator
            .ok_or_else(|| Error::validation("authenticator is required"))?;
        authenticator.validate()?;

        let service_url = match options.url {
            Some(url) if url.trim().is_empty() => String::new(),
            Some(url) => normalize_url(&url)?,
            None => normalize_url(default_url)?,
        };

        Ok(Self {
            service_url,
            default_headers: Vec::new(),
            retry: None,
            authenticator,
            transport: Arc::new(UreqTransport::new()),
        })
    }

    /// Build from `<SERVICE_NAME>_*` configuration keys.
    pub fn from_config(
        source: &dyn ConfigSource,
        service_name: &str,
        default_url: &str,
    ) -> Result<Self> {
        let config = ServiceConfig::load(source, service_name)?;
        let mut service = Self::new(
            ServiceOptions {
                url: config.url,
                authenticator: Some(config.authenticator),
            },
            default_url,
        )?;
        service.retry = config.retry;
        Ok(service)
    }

    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    /// Replace the base URL. Empty or relative URLs are rejected.
    pub fn set_service_url(&mut self, url: &str) -> Result<()> {
        self.service_url = normalize_url(url)?;
        Ok(())
    }

    pub fn default_headers(&self) -> &[(String, String)] {
        &self.default_headers
    }

    /// Headers sent with every request, below per-call headers.
    pub fn set_default_headers(&mut self, headers: Vec<(String, String)>) {
        self.default_headers.clear();
        for (name, value) in &headers {
            set_header(&mut self.default_headers, name, value);
        }
    }

    pub fn authenticator(&self) -> &Arc<dyn Authenticator> {
        &self.authenticator
    }

    /// Swap the transport, e.g. for a host-provided HTTP stack.
    pub fn set_transport(&mut self, transport: Arc<dyn Transport>) {
        self.transport = transport;
    }

    /// Zero for either argument selects the library default for it.
    pub fn enable_retries(&mut self, max_retries: u32, max_interval: Duration) {
        self.retry = Some(RetryPolicy::new(max_retries, max_interval));
    }

    pub fn set_retry_policy(&mut self, policy: RetryPolicy) {
        self.retry = Some(policy);
    }

    pub fn disable_retries(&mut self) {
        self.retry = None;
    }

    pub fn retry_policy(&self) -> Option<&RetryPolicy> {
        self.retry.as_ref()
    }

    /// Validate, render, send (with retries when enabled) and decode.
    pub fn invoke<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        operation: &Operation,
        options: &Options,
        client_params: &[(&str, &str)],
    ) -> Result<DetailedResponse<T>> {
        options.validate_for(operation)?;
        let mut request =
            options.to_request(&self.service_url, client_params, &self.default_headers)?;
        self.authenticator.authenticate(&mut request)?;

        let mut attempt = 0u32;
        loop {
            ctx.check()?;
            debug!(
                operation = operation.name,
                method = %request.method,
                url = %request.url,
                attempt,
                "sending request"
            );
            let started = Instant::now();
            let outcome = self.transport.send(&request, ctx.remaining());

            let decision = match &outcome {
                Ok(response) => {
                    debug!(
                        operation = operation.name,
                        status = response.status,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "received response"
                    );
                    self.retry
                        .as_ref()
                        .map(|p| p.on_response(request.method, response, attempt))
                }
                Err(_) if ctx.is_expired() => return Err(Error::DeadlineExceeded),
                Err(err) => self
                    .retry
                    .as_ref()
                    .map(|p| p.on_error(request.method, err, attempt)),
            };

            match decision {
                Some(Decision::Retry { delay }) => {
                    match &outcome {
                        Ok(response) => warn!(
                            operation = operation.name,
                            status = response.status,
                            delay_ms = delay.as_millis() as u64,
                            attempt,
                            "retrying after retryable status"
                        ),
                        Err(err) => warn!(
                            operation = operation.name,
                            error = %err,
                            delay_ms = delay.as_millis() as u64,
                            attempt,
                            "retrying after transport error"
                        ),
                    }
                    ctx.sleep(delay)?;
                    attempt += 1;
                }
                Some(Decision::Fail) | None => return parse_response(outcome?),
            }
        }
    }
}

fn normalize_url(url: &str) -> Result<String> {
    parse_service_url(url)?;
    Ok(url.trim_end_matches('/').to_string())
}
