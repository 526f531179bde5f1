//! Firewall, rate limiting and WAF events for a zone.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::Authenticator;
use crate::config::ConfigSource;
use crate::context::Context;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::http::HttpMethod;
use crate::options::{Field, FieldKind, Operation, Options};
use crate::response::DetailedResponse;
use crate::service::{BaseService, ServiceOptions};
use crate::services::{require, ServiceClient, CIS_SERVICE_URL};

pub const DEFAULT_SERVICE_NAME: &str = "security_events_api";

pub static SECURITY_EVENTS: Operation = Operation {
    name: "security_events",
    method: HttpMethod::Get,
    path: "/v1/{crn}/zones/{zone_identifier}/security/events",
    fields: &[
        Field::query("ip_class", FieldKind::String),
        Field::query("method", FieldKind::String),
        Field::query("scheme", FieldKind::String),
        Field::query("ip", FieldKind::String),
        Field::query("host", FieldKind::String),
        Field::query("proto", FieldKind::String),
        Field::query("uri", FieldKind::String),
        Field::query("ua", FieldKind::String),
        Field::query("colo", FieldKind::String),
        Field::query("ray_id", FieldKind::String),
        Field::query("kind", FieldKind::String),
        Field::query("action", FieldKind::String),
        Field::query("cursor", FieldKind::String),
        Field::query("country", FieldKind::String),
        Field::query("since", FieldKind::String),
        Field::query("source", FieldKind::String),
        Field::query("limit", FieldKind::Integer),
        Field::query("rule_id", FieldKind::String),
        Field::query("until", FieldKind::String),
    ],
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityEvent {
    #[serde(default)]
    pub ray_id: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub rule_id: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub ip_class: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub colo: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub proto: String,
    #[serde(default)]
    pub scheme: String,
    #[serde(default)]
    pub ua: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub occurred_at: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<SecurityEventMatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityEventMatch {
    #[serde(default)]
    pub rule_id: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub action: String,
}

pub type SecurityEvents = Envelope<Vec<SecurityEvent>>;

#[derive(Debug, Clone, Default)]
pub struct SecurityEventsApiV1Options {
    pub url: Option<String>,
    pub authenticator: Option<Arc<dyn Authenticator>>,
    pub crn: String,
    pub zone_id: String,
}

#[derive(Debug, Clone)]
pub struct SecurityEventsApiV1 {
    service: BaseService,
    crn: String,
    zone_id: String,
}

impl SecurityEventsApiV1 {
    pub fn new(options: SecurityEventsApiV1Options) -> Result<Self> {
        require("crn", &options.crn)?;
        require("zone_id", &options.zone_id)?;
        let service = BaseService::new(
            ServiceOptions {
                url: options.url,
                authenticator: options.authenticator,
            },
            CIS_SERVICE_URL,
        )?;
        Ok(Self {
            service,
            crn: options.crn,
            zone_id: options.zone_id,
        })
    }

    pub fn from_config(source: &dyn ConfigSource, crn: &str, zone_id: &str) -> Result<Self> {
        require("crn", crn)?;
        require("zone_id", zone_id)?;
        Ok(Self {
            service: BaseService::from_config(source, DEFAULT_SERVICE_NAME, CIS_SERVICE_URL)?,
            crn: crn.to_string(),
            zone_id: zone_id.to_string(),
        })
    }

    pub fn crn(&self) -> &str {
        &self.crn
    }

    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    pub fn new_security_events_options(&self) -> Options {
        SECURITY_EVENTS.options()
    }

    pub fn security_events(&self, options: &Options) -> Result<DetailedResponse<SecurityEvents>> {
        self.security_events_with_context(&Context::background(), options)
    }

    pub fn security_events_with_context(
        &self,
        ctx: &Context,
        options: &Options,
    ) -> Result<DetailedResponse<SecurityEvents>> {
        self.service.invoke(
            ctx,
            &SECURITY_EVENTS,
            options,
            &[
                ("crn", self.crn.as_str()),
                ("zone_identifier", self.zone_id.as_str()),
            ],
        )
    }

    /// Fetch every page by following `result_info.cursors.after`, starting
    /// from whatever `cursor` `options` carries. Stops when the server
    /// reports no further cursor or repeats one it already returned.
    pub fn all_security_events(&self, ctx: &Context, options: &Options) -> Result<Vec<SecurityEvent>> {
        let mut page = options.clone();
        let mut seen = HashSet::new();
        let mut events = Vec::new();
        loop {
            let envelope = self.security_events_with_context(ctx, &page)?.result;
            let Some(envelope) = envelope else {
                return Ok(events);
            };
            events.extend(envelope.result.unwrap_or_default());

            let next = envelope
                .result_info
                .as_ref()
                .and_then(|info| info.next_cursor())
                .map(str::to_string);
            match next {
                Some(cursor) if seen.insert(cursor.clone()) => {
                    debug!(cursor = %cursor, fetched = events.len(), "following security events cursor");
                    page.insert("cursor", cursor);
                }
                _ => return Ok(events),
            }
        }
    }
}

impl ServiceClient for SecurityEventsApiV1 {
    fn service(&self) -> &BaseService {
        &self.service
    }

    fn service_mut(&mut self) -> &mut BaseService {
        &mut self.service
    }
}
