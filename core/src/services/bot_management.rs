//! Bot management settings for a zone.

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

pub const DEFAULT_SERVICE_NAME: &str = "bot_management";

const PATH: &str = "/v1/{crn}/zones/{zone_identifier}/bot_management";

pub static GET_BOT_MANAGEMENT: Operation = Operation {
    name: "get_bot_management",
    method: HttpMethod::Get,
    path: PATH,
    fields: &[],
};

pub static UPDATE_BOT_MANAGEMENT: Operation = Operation {
    name: "update_bot_management",
    method: HttpMethod::Put,
    path: PATH,
    fields: &[
        Field::body("fight_mode", FieldKind::Boolean),
        Field::body("session_score", FieldKind::Boolean),
        Field::body("enable_js", FieldKind::Boolean),
        Field::body("auth_id_logging", FieldKind::Boolean),
        Field::body("use_latest_model", FieldKind::Boolean),
    ],
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotManagementSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fight_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_score: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_js: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_id_logging: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_latest_model: Option<bool>,
}

pub type BotManagementResp = Envelope<BotManagementSettings>;

#[derive(Debug, Clone, Default)]
pub struct BotManagementV1Options {
    pub url: Option<String>,
    pub authenticator: Option<Arc<dyn Authenticator>>,
    pub crn: String,
    pub zone_identifier: String,
}

#[derive(Debug, Clone)]
pub struct BotManagementV1 {
    service: BaseService,
    crn: String,
    zone_identifier: String,
}

impl BotManagementV1 {
    pub fn new(options: BotManagementV1Options) -> Result<Self> {
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

    /// Build from `BOT_MANAGEMENT_*` configuration keys.
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

    pub fn new_get_bot_management_options(&self) -> Options {
        GET_BOT_MANAGEMENT.options()
    }

    pub fn get_bot_management(
        &self,
        options: &Options,
    ) -> Result<DetailedResponse<BotManagementResp>> {
        self.get_bot_management_with_context(&Context::background(), options)
    }

    pub fn get_bot_management_with_context(
        &self,
        ctx: &Context,
        options: &Options,
    ) -> Result<DetailedResponse<BotManagementResp>> {
        self.service
            .invoke(ctx, &GET_BOT_MANAGEMENT, options, &self.path_params())
    }

    pub fn new_update_bot_management_options(&self) -> Options {
        UPDATE_BOT_MANAGEMENT.options()
    }

    pub fn update_bot_management(
        &self,
        options: &Options,
    ) -> Result<DetailedResponse<BotManagementResp>> {
        self.update_bot_management_with_context(&Context::background(), options)
    }

    pub fn update_bot_management_with_context(
        &self,
        ctx: &Context,
        options: &Options,
    ) -> Result<DetailedResponse<BotManagementResp>> {
        self.service
            .invoke(ctx, &UPDATE_BOT_MANAGEMENT, options, &self.path_params())
    }

    fn path_params(&self) -> [(&str, &str); 2] {
        [
            ("crn", self.crn.as_str()),
            ("zone_identifier", self.zone_identifier.as_str()),
        ]
    }
}

impl ServiceClient for BotManagementV1 {
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
    use crate::error::Error;
    use crate::testing::{ok, Scripted};

    fn options() -> BotManagementV1Options {
        BotManagementV1Options {
            url: Some("https://cis.test".to_string()),
            authenticator: Some(Arc::new(NoAuthAuthenticator)),
            crn: "crn123".to_string(),
            zone_identifier: "zone9".to_string(),
        }
    }

    #[test]
    fn new_requires_identifiers() {
        let err = BotManagementV1::new(BotManagementV1Options {
            crn: String::new(),
            ..options()
        })
        .unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m.contains("crn")));

        let err = BotManagementV1::new(BotManagementV1Options {
            zone_identifier: " ".to_string(),
            ..options()
        })
        .unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m.contains("zone_identifier")));
    }

    #[test]
    fn new_requires_authenticator() {
        let err = BotManagementV1::new(BotManagementV1Options {
            authenticator: None,
            ..options()
        })
        .unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m.contains("authenticator")));
    }

    #[test]
    fn update_sends_only_set_fields() {
        let transport = Scripted::new(vec![Ok(ok(
            r#"{"success":true,"result":{"enable_js":true},"errors":[],"messages":[]}"#,
        ))]);
        let mut client = BotManagementV1::new(options()).unwrap();
        client.service_mut().set_transport(transport.clone());

        let opts = client
            .new_update_bot_management_options()
            .set("enable_js", true);
        let resp = client.update_bot_management(&opts).unwrap();
        let settings = resp.result.unwrap().result.unwrap();
        assert_eq!(settings.enable_js, Some(true));
        assert_eq!(settings.fight_mode, None);

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, HttpMethod::Put);
        assert_eq!(sent.url, "https://cis.test/v1/crn123/zones/zone9/bot_management");
        assert_eq!(sent.body.as_deref(), Some(r#"{"enable_js":true}"#));
    }

    #[test]
    fn get_rejects_update_options() {
        let client = BotManagementV1::new(options()).unwrap();
        let err = client
            .get_bot_management(&client.new_update_bot_management_options())
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn settings_omit_unset_fields() {
        let settings = BotManagementSettings {
            session_score: Some(false),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&settings).unwrap(),
            r#"{"session_score":false}"#
        );
    }
}
