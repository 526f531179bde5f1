//! Health-change events for global load balancers in an instance.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::Authenticator;
use crate::config::ConfigSource;
use crate::context::Context;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::http::HttpMethod;
use crate::options::{Operation, Options};
use crate::response::DetailedResponse;
use crate::service::{BaseService, ServiceOptions};
use crate::services::{require, ServiceClient, CIS_SERVICE_URL};

pub const DEFAULT_SERVICE_NAME: &str = "global_load_balancer_events";

pub static GET_LOAD_BALANCER_EVENTS: Operation = Operation {
    name: "get_load_balancer_events",
    method: HttpMethod::Get,
    path: "/v1/{crn}/load_balancers/events",
    fields: &[],
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub pool: Vec<PoolHealth>,
    #[serde(default)]
    pub origins: Vec<OriginHealth>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolHealth {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub healthy: bool,
    #[serde(default)]
    pub changed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_origins: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginHealth {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub healthy: bool,
    #[serde(default)]
    pub failure_reason: String,
    #[serde(default)]
    pub changed: bool,
}

pub type ListEventsResp = Envelope<Vec<LoadBalancerEvent>>;

#[derive(Debug, Clone, Default)]
pub struct GlobalLoadBalancerEventsV1Options {
    pub url: Option<String>,
    pub authenticator: Option<Arc<dyn Authenticator>>,
    pub crn: String,
}

#[derive(Debug, Clone)]
pub struct GlobalLoadBalancerEventsV1 {
    service: BaseService,
    crn: String,
}

impl GlobalLoadBalancerEventsV1 {
    pub fn new(options: GlobalLoadBalancerEventsV1Options) -> Result<Self> {
        require("crn", &options.crn)?;
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
        })
    }

    pub fn from_config(source: &dyn ConfigSource, crn: &str) -> Result<Self> {
        require("crn", crn)?;
        Ok(Self {
            service: BaseService::from_config(source, DEFAULT_SERVICE_NAME, CIS_SERVICE_URL)?,
            crn: crn.to_string(),
        })
    }

    pub fn crn(&self) -> &str {
        &self.crn
    }

    pub fn new_get_load_balancer_events_options(&self) -> Options {
        GET_LOAD_BALANCER_EVENTS.options()
    }

    pub fn get_load_balancer_events(&self, options: &Options) -> Result<DetailedResponse<ListEventsResp>> {
        self.get_load_balancer_events_with_context(&Context::background(), options)
    }

    pub fn get_load_balancer_events_with_context(
        &self,
        ctx: &Context,
        options: &Options,
    ) -> Result<DetailedResponse<ListEventsResp>> {
        self.service.invoke(
            ctx,
            &GET_LOAD_BALANCER_EVENTS,
            options,
            &[("crn", self.crn.as_str())],
        )
    }
}

impl ServiceClient for GlobalLoadBalancerEventsV1 {
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
    use crate::auth::BearerTokenAuthenticator;
    use crate::testing::{ok, Scripted};

    #[test]
    fn crn_is_escaped_into_the_path() {
        let transport = Scripted::new(vec![Ok(ok(
            r#"{"success":true,"result":[{"id":"e1","timestamp":"2024-01-01T00:00:00Z","pool":[{"id":"p1","name":"primary","healthy":false,"changed":true}],"origins":[]}],"errors":[],"messages":[],"result_info":{"page":1,"per_page":20,"count":1,"total_count":1}}"#,
        ))]);
        let mut client = GlobalLoadBalancerEventsV1::new(GlobalLoadBalancerEventsV1Options {
            url: Some("https://cis.test".to_string()),
            authenticator: Some(Arc::new(BearerTokenAuthenticator::new("t").unwrap())),
            crn: "crn:v1:a/b".to_string(),
        })
        .unwrap();
        client.service_mut().set_transport(transport.clone());

        let envelope = client
            .get_load_balancer_events(&client.new_get_load_balancer_events_options())
            .unwrap()
            .result
            .unwrap();
        let events = envelope.result.unwrap();
        assert_eq!(events[0].pool[0].name, "primary");
        assert!(events[0].pool[0].changed);
        assert_eq!(envelope.result_info.unwrap().total_count, Some(1));
        assert_eq!(
            transport.requests()[0].url,
            "https://cis.test/v1/crn:v1:a%2Fb/load_balancers/events"
        );
    }

    #[test]
    fn crn_is_required() {
        let err = GlobalLoadBalancerEventsV1::new(GlobalLoadBalancerEventsV1Options {
            authenticator: Some(Arc::new(crate::auth::NoAuthAuthenticator)),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("crn is required"));
    }
}
