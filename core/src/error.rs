//! Error types for the CIS client pipeline.
//!
//! # Design
//! Variants follow the four failure classes a caller has to tell apart:
//! construction/validation problems (nothing was sent), request errors (no
//! response exists), response-processing errors (a 2xx arrived but could not
//! be decoded) and API errors (the server answered with a non-2xx status).
//! The last two carry the raw `HttpResponse` so callers can inspect status,
//! headers and body even though no typed result is produced.

use crate::http::HttpResponse;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The attempt ran out of time.
    Timeout,
    /// No connection could be established (DNS failure, refused, ...).
    Connect,
    /// The connection broke while the request or response was in flight.
    Io,
    /// Anything else reported by the HTTP stack.
    Other,
}

/// Errors returned by every client operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required option or identifier is absent, or a value has the wrong shape.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A configuration key is missing or holds an unusable value.
    #[error("configuration error for '{key}': {message}")]
    Configuration { key: String, message: String },

    /// The client has no base URL to send the request to.
    #[error("service URL missing")]
    ServiceUrlMissing,

    /// The base URL is not a well-formed absolute URL.
    #[error("invalid service URL '{url}': {reason}")]
    InvalidServiceUrl { url: String, reason: String },

    /// The request could not be rendered (for example a path parameter is absent).
    #[error("request construction failed: {0}")]
    RequestConstruction(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The request never produced a response.
    #[error("request failed ({kind:?}): {message}")]
    Transport {
        kind: TransportErrorKind,
        message: String,
    },

    /// The caller's deadline passed before the operation completed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// The caller cancelled the operation.
    #[error("request cancelled")]
    Cancelled,

    /// A 2xx response arrived but its body is not the expected JSON envelope.
    #[error("error processing the HTTP response: {message}")]
    ResponseProcessing {
        message: String,
        response: Box<HttpResponse>,
    },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Api {
        status: u16,
        message: String,
        errors: Vec<Vec<String>>,
        messages: Vec<Vec<String>>,
        response: Box<HttpResponse>,
    },
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub(crate) fn configuration(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Configuration {
            key: key.into(),
            message: message.into(),
        }
    }

    /// The raw response, when the failure happened after one was received.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Error::ResponseProcessing { response, .. } | Error::Api { response, .. } => {
                Some(response)
            }
            _ => None,
        }
    }

    /// HTTP status of the response that caused the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        self.response().map(|r| r.status)
    }

    /// Whether this is a transport failure of the given kind.
    pub fn is_transport(&self, expected: TransportErrorKind) -> bool {
        matches!(self, Error::Transport { kind, .. } if *kind == expected)
    }
}
