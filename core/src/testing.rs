//! Test doubles shared by the unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

/// Replays scripted outcomes in order and records the requests it saw.
/// Once the script runs out every call gets `200 {}`.
pub(crate) struct Scripted {
    outcomes: Mutex<Vec<Result<HttpResponse>>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl Scripted {
    pub(crate) fn new(mut outcomes: Vec<Result<HttpResponse>>) -> Arc<Self> {
        outcomes.reverse();
        Arc::new(Self {
            outcomes: Mutex::new(outcomes),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl Transport for Scripted {
    fn send(&self, request: &HttpRequest, _timeout: Option<Duration>) -> Result<HttpResponse> {
        self.seen.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Ok(ok("{}")))
    }
}

pub(crate) fn ok(body: &str) -> HttpResponse {
    status(200, body)
}

pub(crate) fn status(code: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status: code,
        headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        body: body.to_string(),
    }
}
