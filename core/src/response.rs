//! Response decoding: turns an `HttpResponse` into a typed result or an error.
//!
//! # Design
//! Decoding is a pure function of the response. A 2xx with an empty body is
//! a valid "no result" outcome; a 2xx whose body does not match the expected
//! shape is a processing error; any other status is an API error. Both error
//! cases keep the raw response so it can be inspected.

use serde::de::DeserializeOwned;

use crate::envelope::ErrorEnvelope;
use crate::error::{Error, Result};
use crate::http::HttpResponse;

/// A decoded response together with the wire-level details it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailedResponse<T> {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// Raw body exactly as received.
    pub body: String,
    /// `None` when the server sent no body.
    pub result: Option<T>,
}

impl<T> DetailedResponse<T> {
    /// First value of `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Decode `response` into `T`, or map it to the matching error variant.
pub fn parse_response<T: DeserializeOwned>(response: HttpResponse) -> Result<DetailedResponse<T>> {
    if !response.is_success() {
        return Err(api_error(response));
    }

    let result = if response.body.trim().is_empty() {
        None
    } else {
        match serde_json::from_str::<T>(&response.body) {
            Ok(value) => Some(value),
            Err(e) => {
                return Err(Error::ResponseProcessing {
                    message: e.to_string(),
                    response: Box::new(response),
                })
            }
        }
    };

    Ok(DetailedResponse {
        status: response.status,
        headers: response.headers,
        body: response.body,
        result,
    })
}

fn api_error(response: HttpResponse) -> Error {
    let envelope: ErrorEnvelope = serde_json::from_str(&response.body).unwrap_or_default();
    let message = envelope
        .errors
        .iter()
        .map(|entry| entry.join(": "))
        .filter(|entry| !entry.is_empty())
        .collect::<Vec<_>>()
        .join("; ");
    let message = if message.is_empty() {
        ureq::http::StatusCode::from_u16(response.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("unexpected status")
            .to_string()
    } else {
        message
    };

    Error::Api {
        status: response.status,
        message,
        errors: envelope.errors,
        messages: envelope.messages,
        response: Box::new(response),
    }
}
