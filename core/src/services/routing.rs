//! Smart routing (Argo) for a zone.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

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

pub const DEFAULT_SERVICE_NAME: &str = "routing";

const PATH: &str = "/v1/{crn}/zones/{zone_identifier}/routing/smart_routing";

pub static GET_SMART_ROUTING: Operation = Operation {
    name: "get_smart_routing",
    method: HttpMethod::Get,
    path: PATH,
    fields: &[],
};

pub static UPDATE_SMART_ROUTING: Operation = Operation {
    name: "update_smart_routing",
    method: HttpMethod::Patch,
    path: PATH,
    fields: &[Field::body("value", FieldKind::String)],
};

pub const SMART_ROUTING_ON: &str = "on";
pub const SMART_ROUTING_OFF: &str = "off";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartRoutingSetting {
    pub id: String,
    /// `on` or `off`.
    pub value: String,
    #[serde(default)]
    pub editable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_on: Option<String>,
}

pub type SmartRoutingResp = Envelope<SmartRoutingSetting>;

#[derive(Debug, Clone, Default)]
pub struct RoutingV1Options {
    pub url: Option<String>,
    pub authenticator: Option<Arc<dyn Authenticator>>,
    pub crn: String,
    pub zone_identifier: String,
}

#[derive(Debug, Clone)]
pub struct RoutingV1 {
    service: BaseService,
    crn: String,
    zone_identifier: String,
}

impl RoutingV1 {
    pub fn new(options: RoutingV1Options) -> Result<Self> {
        require("crn", &options.crn)?;
        require("zone_identifier", &options.zone_identifier)?;
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
            zone_identifier: options.zone_identifier,
        })
    }

    pub fn from_config(source: &dyn ConfigSource, crn: &str, zone_identifier: &str) -> Result<Self> {
        require("crn", crn)?;
        require("zone_identifier", zone_identifier)?;
        Ok(Self {
            service: BaseService::from_config(source, DEFAULT_SERVICE_NAME, CIS_SERVICE_URL)?,
            crn: crn.to_string(),
            zone_identifier: zone_identifier.to_string(),
        })
    }

    pub fn crn(&self) -> &str {
        &self.crn
    }

    pub fn zone_identifier(&self) -> &str {
        &self.zone_identifier
    }

    pub fn new_get_smart_routing_options(&self) -> Options {
        GET_SMART_ROUTING.options()
    }

    pub fn get_smart_routing(&self, options: &Options) -> Result<DetailedResponse<SmartRoutingResp>> {
        self.get_smart_routing_with_context(&Context::background(), options)
    }

    pub fn get_smart_routing_with_context(
        &self,
        ctx: &Context,
        options: &Options,
    ) -> Result<DetailedResponse<SmartRoutingResp>> {
        self.service
            .invoke(ctx, &GET_SMART_ROUTING, options, &self.path_params())
    }

    pub fn new_update_smart_routing_options(&self) -> Options {
        UPDATE_SMART_ROUTING.options()
    }

    pub fn update_smart_routing(&self, options: &Options) -> Result<DetailedResponse<SmartRoutingResp>> {
        self.update_smart_routing_with_context(&Context::background(), options)
    }

    pub fn update_smart_routing_with_context(
        &self,
        ctx: &Context,
        options: &Options,
    ) -> Result<DetailedResponse<SmartRoutingResp>> {
        self.service
            .invoke(ctx, &UPDATE_SMART_ROUTING, options, &self.path_params())
    }

    fn path_params(&self) -> [(&str, &str); 2] {
        [
            ("crn", self.crn.as_str()),
            ("zone_identifier", self.zone_identifier.as_str()),
        ]
    }
}

impl ServiceClient for RoutingV1 {
    fn service(&self) -> &BaseService {
        &self.service
    }

    fn service_mut(&mut self) -> &mut BaseService {
        &mut self.service
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::NoAuthAuthenticator;
    use crate::testing::{ok, status, Scripted};
    use std::time::Duration;

    fn client(transport: Arc<Scripted>) -> RoutingV1 {
        let mut client = RoutingV1::new(RoutingV1Options {
            url: Some("https://cis.test".to_string()),
            authenticator: Some(Arc::new(NoAuthAuthenticator)),
            crn: "crn1".to_string(),
            zone_identifier: "z1".to_string(),
        })
        .unwrap();
        client.service_mut().set_transport(transport);
        client
    }

    #[test]
    fn update_patches_value() {
        let transport = Scripted::new(vec![Ok(ok(
            r#"{"success":true,"result":{"id":"smart_routing","value":"on","editable":true},"errors":[],"messages":[]}"#,
        ))]);
        let client = client(transport.clone());
        let resp = client
            .update_smart_routing(&client.new_update_smart_routing_options().set("value", SMART_ROUTING_ON))
            .unwrap();
        assert_eq!(resp.result.unwrap().result.unwrap().value, "on");

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, HttpMethod::Patch);
        assert_eq!(sent.url, "https://cis.test/v1/crn1/zones/z1/routing/smart_routing");
        assert_eq!(sent.body.as_deref(), Some(r#"{"value":"on"}"#));
    }

    #[test]
    fn patch_retries_only_on_rate_limit() {
        let transport = Scripted::new(vec![
            Ok(status(429, "")),
            Ok(status(503, "")),
        ]);
        let mut client = client(transport.clone());
        client.service_mut().set_retry_policy(
            crate::retry::RetryPolicy::new(3, Duration::from_millis(5))
                .with_min_interval(Duration::from_millis(1)),
        );
        let err = client
            .update_smart_routing(&client.new_update_smart_routing_options().set("value", "off"))
            .unwrap_err();
        assert_eq!(err.status_code(), Some(503));
        assert_eq!(transport.calls(), 2);
    }
}
