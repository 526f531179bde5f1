//! The address ranges CIS serves traffic from.

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
use crate::services::{ServiceClient, CIS_SERVICE_URL};

pub const DEFAULT_SERVICE_NAME: &str = "ips_api";

pub static LIST_IPS: Operation = Operation {
    name: "list_ips",
    method: HttpMethod::Get,
    path: "/v1/ips",
    fields: &[],
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpRanges {
    #[serde(default)]
    pub ipv4_cidrs: Vec<String>,
    #[serde(default)]
    pub ipv6_cidrs: Vec<String>,
}

pub type IpResponse = Envelope<IpRanges>;

#[derive(Debug, Clone, Default)]
pub struct IpsApiV1Options {
    pub url: Option<String>,
    pub authenticator: Option<Arc<dyn Authenticator>>,
}

#[derive(Debug, Clone)]
pub struct IpsApiV1 {
    service: BaseService,
}

impl IpsApiV1 {
    pub fn new(options: IpsApiV1Options) -> Result<Self> {
        let service = BaseService::new(
            ServiceOptions {
                url: options.url,
                authenticator: options.authenticator,
            },
            CIS_SERVICE_URL,
        )?;
        Ok(Self { service })
    }

    pub fn from_config(source: &dyn ConfigSource) -> Result<Self> {
        Ok(Self {
            service: BaseService::from_config(source, DEFAULT_SERVICE_NAME, CIS_SERVICE_URL)?,
        })
    }

    pub fn new_list_ips_options(&self) -> Options {
        LIST_IPS.options()
    }

    pub fn list_ips(&self, options: &Options) -> Result<DetailedResponse<IpResponse>> {
        self.list_ips_with_context(&Context::background(), options)
    }

    pub fn list_ips_with_context(
        &self,
        ctx: &Context,
        options: &Options,
    ) -> Result<DetailedResponse<IpResponse>> {
        self.service.invoke(ctx, &LIST_IPS, options, &[])
    }
}

impl ServiceClient for IpsApiV1 {
    fn service(&self) -> &BaseService {
        &self.service
    }

    fn service_mut(&mut self) -> &mut BaseService {
        &mut self.service
    }
}
