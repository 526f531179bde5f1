//! Resource records inside a DNS Services zone.
//!
//! Unlike the zone-scoped CIS APIs, the instance and zone identifiers are
//! per-call path fields, so one client can address any zone.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::Authenticator;
use crate::config::ConfigSource;
use crate::context::Context;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::http::HttpMethod;
use crate::options::{Field, FieldKind, Operation, Options};
use crate::response::DetailedResponse;
use crate::service::{BaseService, ServiceOptions};
use crate::services::ServiceClient;

pub const DEFAULT_SERVICE_NAME: &str = "dns_svcs";

pub const DEFAULT_SERVICE_URL: &str = "https://api.dns-svcs.cloud.ibm.com";

const COLLECTION: &str = "/v1/instances/{instance_id}/dnszones/{dnszone_id}/resource_records";
const ITEM: &str = "/v1/instances/{instance_id}/dnszones/{dnszone_id}/resource_records/{record_id}";

const CORRELATION: Field = Field::header("X-Correlation-ID");

pub static LIST_RESOURCE_RECORDS: Operation = Operation {
    name: "list_resource_records",
    method: HttpMethod::Get,
    path: COLLECTION,
    fields: &[
        Field::path("instance_id"),
        Field::path("dnszone_id"),
        CORRELATION,
        Field::query("offset", FieldKind::Integer),
        Field::query("limit", FieldKind::Integer),
        Field::query("type", FieldKind::String),
        Field::query("name", FieldKind::String),
    ],
};

pub static CREATE_RESOURCE_RECORD: Operation = Operation {
    name: "create_resource_record",
    method: HttpMethod::Post,
    path: COLLECTION,
    fields: &[
        Field::path("instance_id"),
        Field::path("dnszone_id"),
        CORRELATION,
        Field::body("name", FieldKind::String),
        Field::body("type", FieldKind::String).required(),
        Field::body("rdata", FieldKind::Object),
        Field::body("ttl", FieldKind::Integer),
    ],
};

pub static GET_RESOURCE_RECORD: Operation = Operation {
    name: "get_resource_record",
    method: HttpMethod::Get,
    path: ITEM,
    fields: &[
        Field::path("instance_id"),
        Field::path("dnszone_id"),
        Field::path("record_id"),
        CORRELATION,
    ],
};

pub static UPDATE_RESOURCE_RECORD: Operation = Operation {
    name: "update_resource_record",
    method: HttpMethod::Put,
    path: ITEM,
    fields: &[
        Field::path("instance_id"),
        Field::path("dnszone_id"),
        Field::path("record_id"),
        CORRELATION,
        Field::body("name", FieldKind::String),
        Field::body("rdata", FieldKind::Object),
        Field::body("ttl", FieldKind::Integer),
    ],
};

pub static DELETE_RESOURCE_RECORD: Operation = Operation {
    name: "delete_resource_record",
    method: HttpMethod::Delete,
    path: ITEM,
    fields: &[
        Field::path("instance_id"),
        Field::path("dnszone_id"),
        Field::path("record_id"),
        CORRELATION,
    ],
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
    /// Type-specific data, e.g. `{"ip": "10.0.0.1"}` for an `A` record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rdata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_on: Option<String>,
}

pub type ResourceRecordResp = Envelope<ResourceRecord>;

pub type ResourceRecordList = Envelope<Vec<ResourceRecord>>;

pub type DeleteResp = Envelope<Value>;

#[derive(Debug, Clone, Default)]
pub struct DnsRecordsV1Options {
    pub url: Option<String>,
    pub authenticator: Option<Arc<dyn Authenticator>>,
}

#[derive(Debug, Clone)]
pub struct DnsRecordsV1 {
    service: BaseService,
}

impl DnsRecordsV1 {
    pub fn new(options: DnsRecordsV1Options) -> Result<Self> {
        let service = BaseService::new(
            ServiceOptions {
                url: options.url,
                authenticator: options.authenticator,
            },
            DEFAULT_SERVICE_URL,
        )?;
        Ok(Self { service })
    }

    pub fn from_config(source: &dyn ConfigSource) -> Result<Self> {
        Ok(Self {
            service: BaseService::from_config(source, DEFAULT_SERVICE_NAME, DEFAULT_SERVICE_URL)?,
        })
    }

    pub fn new_list_resource_records_options(&self, instance_id: &str, dnszone_id: &str) -> Options {
        LIST_RESOURCE_RECORDS
            .options()
            .set("instance_id", instance_id)
            .set("dnszone_id", dnszone_id)
    }

    pub fn list_resource_records(&self, options: &Options) -> Result<DetailedResponse<ResourceRecordList>> {
        self.list_resource_records_with_context(&Context::background(), options)
    }

    pub fn list_resource_records_with_context(
        &self,
        ctx: &Context,
        options: &Options,
    ) -> Result<DetailedResponse<ResourceRecordList>> {
        self.service.invoke(ctx, &LIST_RESOURCE_RECORDS, options, &[])
    }

    pub fn new_create_resource_record_options(&self, instance_id: &str, dnszone_id: &str) -> Options {
        CREATE_RESOURCE_RECORD
            .options()
            .set("instance_id", instance_id)
            .set("dnszone_id", dnszone_id)
    }

    pub fn create_resource_record(&self, options: &Options) -> Result<DetailedResponse<ResourceRecordResp>> {
        self.create_resource_record_with_context(&Context::background(), options)
    }

    pub fn create_resource_record_with_context(
        &self,
        ctx: &Context,
        options: &Options,
    ) -> Result<DetailedResponse<ResourceRecordResp>> {
        self.service.invoke(ctx, &CREATE_RESOURCE_RECORD, options, &[])
    }

    pub fn new_get_resource_record_options(
        &self,
        instance_id: &str,
        dnszone_id: &str,
        record_id: &str,
    ) -> Options {
        item_options(&GET_RESOURCE_RECORD, instance_id, dnszone_id, record_id)
    }

    pub fn get_resource_record(&self, options: &Options) -> Result<DetailedResponse<ResourceRecordResp>> {
        self.get_resource_record_with_context(&Context::background(), options)
    }

    pub fn get_resource_record_with_context(
        &self,
        ctx: &Context,
        options: &Options,
    ) -> Result<DetailedResponse<ResourceRecordResp>> {
        self.service.invoke(ctx, &GET_RESOURCE_RECORD, options, &[])
    }

    pub fn new_update_resource_record_options(
        &self,
        instance_id: &str,
        dnszone_id: &str,
        record_id: &str,
    ) -> Options {
        item_options(&UPDATE_RESOURCE_RECORD, instance_id, dnszone_id, record_id)
    }

    pub fn update_resource_record(&self, options: &Options) -> Result<DetailedResponse<ResourceRecordResp>> {
        self.update_resource_record_with_context(&Context::background(), options)
    }

    pub fn update_resource_record_with_context(
        &self,
        ctx: &Context,
        options: &Options,
    ) -> Result<DetailedResponse<ResourceRecordResp>> {
        self.service.invoke(ctx, &UPDATE_RESOURCE_RECORD, options, &[])
    }

    pub fn new_delete_resource_record_options(
        &self,
        instance_id: &str,
        dnszone_id: &str,
        record_id: &str,
    ) -> Options {
        item_options(&DELETE_RESOURCE_RECORD, instance_id, dnszone_id, record_id)
    }

    /// The server answers `204` with no body, leaving `result` empty.
    pub fn delete_resource_record(&self, options: &Options) -> Result<DetailedResponse<DeleteResp>> {
        self.delete_resource_record_with_context(&Context::background(), options)
    }

    pub fn delete_resource_record_with_context(
        &self,
        ctx: &Context,
        options: &Options,
    ) -> Result<DetailedResponse<DeleteResp>> {
        self.service.invoke(ctx, &DELETE_RESOURCE_RECORD, options, &[])
    }
}

fn item_options(
    operation: &'static Operation,
    instance_id: &str,
    dnszone_id: &str,
    record_id: &str,
) -> Options {
    operation
        .options()
        .set("instance_id", instance_id)
        .set("dnszone_id", dnszone_id)
        .set("record_id", record_id)
}

impl ServiceClient for DnsRecordsV1 {
    fn service(&self) -> &BaseService {
        &self.service
    }

    fn service_mut(&mut self) -> &mut BaseService {
        &mut self.service
    }
}
