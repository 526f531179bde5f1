//! Per-operation parameter bags keyed by field name.
//!
//! # Design
//! An [`Operation`] is a static description: method, path template and the
//! fields a caller may set, each with a location and a value kind. An
//! [`Options`] value is bound to one operation and holds whatever the caller
//! set. Validation and rendering are driven entirely by the description, so
//! service modules contain no per-operation request code.
//!
//! Template parameters that are not declared as fields (the CRN and zone a
//! client was built for) are supplied by the client when rendering.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest};
use crate::request::RequestBuilder;

/// Where a field travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Path,
    Query,
    Body,
    Header,
}

/// Expected JSON shape of a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Boolean,
    Array,
    Object,
    Any,
}

impl FieldKind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::Array => value.is_array(),
            FieldKind::Object => value.is_object(),
            FieldKind::Any => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub location: Location,
    pub kind: FieldKind,
    pub required: bool,
}

impl Field {
    /// Path parameters are always required strings.
    pub const fn path(name: &'static str) -> Self {
        Self {
            name,
            location: Location::Path,
            kind: FieldKind::String,
            required: true,
        }
    }

    pub const fn query(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            location: Location::Query,
            kind,
            required: false,
        }
    }

    pub const fn body(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            location: Location::Body,
            kind,
            required: false,
        }
    }

    /// `name` doubles as the header name.
    pub const fn header(name: &'static str) -> Self {
        Self {
            name,
            location: Location::Header,
            kind: FieldKind::String,
            required: false,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Static description of one API operation.
#[derive(Debug)]
pub struct Operation {
    pub name: &'static str,
    pub method: HttpMethod,
    pub path: &'static str,
    pub fields: &'static [Field],
}

impl Operation {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_body(&self) -> bool {
        self.fields.iter().any(|f| f.location == Location::Body)
    }

    /// Empty options bound to this operation.
    pub fn options(&'static self) -> Options {
        Options::new(self)
    }
}

/// Values set by the caller for one invocation of an operation.
#[derive(Debug, Clone)]
pub struct Options {
    operation: &'static Operation,
    values: BTreeMap<String, Value>,
    headers: Vec<(String, String)>,
}

impl Options {
    pub fn new(operation: &'static Operation) -> Self {
        Self {
            operation,
            values: BTreeMap::new(),
            headers: Vec::new(),
        }
    }

    pub fn operation(&self) -> &'static Operation {
        self.operation
    }

    /// Set a field. `Value::Null` clears it.
    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        match value.into() {
            Value::Null => {
                self.values.remove(name);
            }
            value => {
                self.values.insert(name.to_string(), value);
            }
        }
    }

    pub fn unset(mut self, name: &str) -> Self {
        self.values.remove(name);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Read a field back as `T`; `None` if unset or of another shape.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.get(name)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Add a custom header. Custom headers win over every default except
    /// `Content-Type` on requests with a body.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        crate::http::set_header(&mut self.headers, name, value);
        self
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Check the values against the operation's field list.
    pub fn validate(&self) -> Result<()> {
        let op = self.operation;
        if let Some(unknown) = self.values.keys().find(|k| op.field(k).is_none()) {
            return Err(Error::validation(format!(
                "unknown field '{unknown}' for operation '{}'",
                op.name
            )));
        }
        for field in op.fields {
            match self.values.get(field.name) {
                None if field.required => {
                    return Err(Error::validation(format!(
                        "missing required field '{}' for operation '{}'",
                        field.name, op.name
                    )))
                }
                Some(Value::String(s)) if field.required && s.is_empty() => {
                    return Err(Error::validation(format!(
                        "required field '{}' for operation '{}' is empty",
                        field.name, op.name
                    )))
                }
                Some(value) if !field.kind.accepts(value) => {
                    return Err(Error::validation(format!(
                        "field '{}' for operation '{}' expects {:?}, got {value}",
                        field.name, op.name, field.kind
                    )))
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Validate these options as input to `expected`.
    pub fn validate_for(&self, expected: &Operation) -> Result<()> {
        if self.operation.name != expected.name {
            return Err(Error::validation(format!(
                "options built for '{}' passed to '{}'",
                self.operation.name, expected.name
            )));
        }
        self.validate()
    }

    /// Render the request. `client_params` fill template parameters owned
    /// by the client; `default_headers` sit below the caller's headers.
    pub fn to_request(
        &self,
        base_url: &str,
        client_params: &[(&str, &str)],
        default_headers: &[(String, String)],
    ) -> Result<HttpRequest> {
        let op = self.operation;
        let mut builder = RequestBuilder::new(op.method, base_url, op.path).headers(default_headers);
        for (name, value) in client_params {
            builder = builder.path_param(name, *value);
        }

        let mut body = serde_json::Map::new();
        for field in op.fields {
            let Some(value) = self.values.get(field.name) else {
                continue;
            };
            builder = match field.location {
                Location::Path => builder.path_param(field.name, scalar(value)),
                Location::Header => builder.header(field.name, &scalar(value)),
                Location::Query => match value {
                    Value::Array(items) => items
                        .iter()
                        .fold(builder, |b, item| b.query(field.name, scalar(item))),
                    other => builder.query(field.name, scalar(other)),
                },
                Location::Body => {
                    body.insert(field.name.to_string(), value.clone());
                    builder
                }
            };
        }

        builder = builder.headers(&self.headers);
        if op.has_body() {
            builder = builder.json_body(Value::Object(body));
        }
        builder.build()
    }
}

/// Render a value for a path segment, query pair or header.
fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
