//! Generic request builder: path template, path parameters, query, headers
//! and JSON body in, `HttpRequest` out.
//!
//! # Design
//! Every operation in every service module goes through this one builder;
//! operations differ only in the template and the values they feed it.
//! Rendering fails before any I/O when the base URL is empty or malformed or
//! when a template parameter has no value.

use url::Url;

use crate::error::{Error, Result};
use crate::http::{set_header, HttpMethod, HttpRequest};

pub(crate) const USER_AGENT: &str = concat!("cis-core/", env!("CARGO_PKG_VERSION"));

/// Fluent builder for a single `HttpRequest`.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: HttpMethod,
    base_url: String,
    template: String,
    path_params: Vec<(String, String)>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl RequestBuilder {
    pub fn new(method: HttpMethod, base_url: &str, template: &str) -> Self {
        Self {
            method,
            base_url: base_url.to_string(),
            template: template.to_string(),
            path_params: Vec::new(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn path_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.path_params.push((name.to_string(), value.into()));
        self
    }

    /// Append a query pair. Calling twice with the same key sends the key twice.
    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// Set a header; later calls replace earlier values of the same name.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        set_header(&mut self.headers, name, value);
        self
    }

    pub fn headers<'a>(mut self, headers: impl IntoIterator<Item = &'a (String, String)>) -> Self {
        for (name, value) in headers {
            set_header(&mut self.headers, name, value);
        }
        self
    }

    pub fn json_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn build(self) -> Result<HttpRequest> {
        let mut url = parse_service_url(&self.base_url)?;
        let segments = render_path(&self.template, &self.path_params)?;

        {
            let mut path = url.path_segments_mut().map_err(|()| Error::InvalidServiceUrl {
                url: self.base_url.clone(),
                reason: "URL cannot carry a path".to_string(),
            })?;
            path.pop_if_empty();
            path.extend(segments.iter().map(String::as_str));
        }

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }

        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
        ];
        for (name, value) in &self.headers {
            set_header(&mut headers, name, value);
        }

        let body = match self.body {
            Some(value) => {
                set_header(&mut headers, "Content-Type", "application/json");
                Some(serde_json::to_string(&value)?)
            }
            None => None,
        };

        Ok(HttpRequest {
            method: self.method,
            url: url.into(),
            headers,
            body,
        })
    }
}

/// Parse a service base URL, rejecting empty, relative and non-HTTP values.
pub fn parse_service_url(raw: &str) -> Result<Url> {
    if raw.trim().is_empty() {
        return Err(Error::ServiceUrlMissing);
    }
    let invalid = |reason: String| Error::InvalidServiceUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("expected an absolute http(s) URL".to_string()));
    }
    Ok(url)
}

/// Resolve each `{name}` segment of `template` against `params`.
fn render_path(template: &str, params: &[(String, String)]) -> Result<Vec<String>> {
    template
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let Some(name) = segment
                .strip_prefix('{')
                .and_then(|rest| rest.strip_suffix('}'))
            else {
                return Ok(segment.to_string());
            };
            params
                .iter()
                .rev()
                .find(|(key, value)| key == name && !value.is_empty())
                .map(|(_, value)| value.clone())
                .ok_or_else(|| {
                    Error::RequestConstruction(format!("missing path parameter '{name}'"))
                })
        })
        .collect()
}
