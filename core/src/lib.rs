//! Blocking client core for IBM Cloud Internet Services (CIS) REST APIs.
//!
//! # Overview
//! Every API module funnels through one pipeline: an [`Options`] value bound
//! to a static [`Operation`] is validated, rendered into an [`HttpRequest`],
//! decorated by an [`Authenticator`], sent by a [`Transport`] under an
//! optional [`RetryPolicy`] and [`Context`] deadline, and decoded from the
//! `{success, result, errors, messages}` [`Envelope`] into a
//! [`DetailedResponse`].
//!
//! # Design
//! - Rendering (`request`, `options`) and decoding (`response`) are pure;
//!   only `transport` touches the network, so the pipeline is testable
//!   without a server and hosts can plug in their own HTTP stack.
//! - `BaseService` owns URL, headers and retry settings by value and shares
//!   the authenticator and transport by `Arc`, so clones diverge safely.
//! - Configuration comes from an injected [`ConfigSource`]; nothing reads
//!   the process environment unless handed an [`EnvSource`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use cis_core::services::bot_management::{BotManagementV1, BotManagementV1Options};
//! use cis_core::BearerTokenAuthenticator;
//!
//! # fn main() -> cis_core::Result<()> {
//! let client = BotManagementV1::new(BotManagementV1Options {
//!     url: None,
//!     authenticator: Some(Arc::new(BearerTokenAuthenticator::new("token")?)),
//!     crn: "crn:v1:bluemix:public:internet-svcs:global:a/123::".to_string(),
//!     zone_identifier: "zone-1".to_string(),
//! })?;
//! let settings = client.get_bot_management(&client.new_get_bot_management_options())?;
//! println!("{:?}", settings.result);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod context;
pub mod envelope;
pub mod error;
pub mod http;
pub mod options;
pub mod request;
pub mod response;
pub mod retry;
pub mod service;
pub mod services;
pub mod transport;

#[cfg(test)]
mod testing;

pub use auth::{Authenticator, BasicAuthenticator, BearerTokenAuthenticator, NoAuthAuthenticator};
pub use config::{ConfigSource, EnvSource, MapSource, ServiceConfig};
pub use context::{CancelToken, Context};
pub use envelope::{Envelope, ResultInfo};
pub use error::{Error, Result, TransportErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use options::{Field, FieldKind, Location, Operation, Options};
pub use request::RequestBuilder;
pub use response::{parse_response, DetailedResponse};
pub use retry::RetryPolicy;
pub use service::{BaseService, ServiceOptions};
pub use services::ServiceClient;
pub use transport::{Transport, UreqTransport};
