//! Full lifecycle tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every module client
//! over real HTTP through the default ureq transport. Validates that request
//! rendering, authentication headers and envelope decoding agree with the
//! server end to end.

use std::sync::Arc;

use cis_core::services::bot_management::{BotManagementSettings, BotManagementV1, BotManagementV1Options};
use cis_core::services::dns_records::{DnsRecordsV1, DnsRecordsV1Options};
use cis_core::services::ip_list::{IpsApiV1, IpsApiV1Options};
use cis_core::services::lb_events::{GlobalLoadBalancerEventsV1, GlobalLoadBalancerEventsV1Options};
use cis_core::services::routing::{RoutingV1, RoutingV1Options};
use cis_core::services::security_events::{SecurityEventsApiV1, SecurityEventsApiV1Options};
use cis_core::{BearerTokenAuthenticator, Context, Error, MapSource, NoAuthAuthenticator, ServiceClient};
use serde_json::json;

const CRN: &str = "crn:v1:bluemix:public:internet-svcs:global:a/abc123:instance-1::";
const ZONE: &str = "zone-1";

fn server() -> String {
    let addr = mock_server::spawn(mock_server::app()).unwrap();
    format!("http://{addr}")
}

#[test]
fn ip_ranges() {
    let client = IpsApiV1::new(IpsApiV1Options {
        url: Some(server()),
        authenticator: Some(Arc::new(NoAuthAuthenticator)),
    })
    .unwrap();

    let resp = client.list_ips(&client.new_list_ips_options()).unwrap();
    assert_eq!(resp.status, 200);
    let envelope = resp.result.unwrap();
    assert!(envelope.success);
    assert!(envelope.result.unwrap().ipv6_cidrs.contains(&"2400:cb00::/32".to_string()));
}

#[test]
fn bot_management_lifecycle() {
    let client = BotManagementV1::new(BotManagementV1Options {
        url: Some(server()),
        authenticator: Some(Arc::new(BearerTokenAuthenticator::new("token").unwrap())),
        crn: CRN.to_string(),
        zone_identifier: ZONE.to_string(),
    })
    .unwrap();

    // Step 1: untouched zone reports everything off.
    let initial = client
        .get_bot_management(&client.new_get_bot_management_options())
        .unwrap()
        .result
        .unwrap()
        .result
        .unwrap();
    assert_eq!(initial.enable_js, Some(false));

    // Step 2: PUT every field; the server echoes the stored object.
    let opts = client
        .new_update_bot_management_options()
        .set("fight_mode", false)
        .set("session_score", false)
        .set("enable_js", true)
        .set("auth_id_logging", false)
        .set("use_latest_model", false);
    let updated = client.update_bot_management(&opts).unwrap();
    assert_eq!(
        updated.result.unwrap().result,
        Some(BotManagementSettings {
            fight_mode: Some(false),
            session_score: Some(false),
            enable_js: Some(true),
            auth_id_logging: Some(false),
            use_latest_model: Some(false),
        })
    );

    // Step 3: a partial update keeps the other fields.
    let opts = client.new_update_bot_management_options().set("fight_mode", true);
    client.update_bot_management(&opts).unwrap();
    let current = client
        .get_bot_management(&client.new_get_bot_management_options())
        .unwrap()
        .result
        .unwrap()
        .result
        .unwrap();
    assert_eq!(current.fight_mode, Some(true));
    assert_eq!(current.enable_js, Some(true));
}

#[test]
fn smart_routing_lifecycle() {
    let client = RoutingV1::new(RoutingV1Options {
        url: Some(server()),
        authenticator: Some(Arc::new(NoAuthAuthenticator)),
        crn: CRN.to_string(),
        zone_identifier: ZONE.to_string(),
    })
    .unwrap();

    let get = || {
        client
            .get_smart_routing(&client.new_get_smart_routing_options())
            .unwrap()
            .result
            .unwrap()
            .result
            .unwrap()
    };
    assert_eq!(get().value, "off");

    client
        .update_smart_routing(&client.new_update_smart_routing_options().set("value", "on"))
        .unwrap();
    assert_eq!(get().value, "on");

    let err = client
        .update_smart_routing(&client.new_update_smart_routing_options().set("value", "maybe"))
        .unwrap_err();
    match err {
        Error::Api {
            status,
            ref message,
            ref errors,
            ..
        } => {
            assert_eq!(status, 400);
            assert!(message.starts_with("1007: "));
            assert_eq!(errors[0][0], "1007");
        }
        other => panic!("expected API error, got {other:?}"),
    }
    assert_eq!(err.response().unwrap().status, 400);
}

#[test]
fn dns_record_lifecycle() {
    let client = DnsRecordsV1::new(DnsRecordsV1Options {
        url: Some(server()),
        authenticator: Some(Arc::new(NoAuthAuthenticator)),
    })
    .unwrap();

    // Step 1: create.
    let opts = client
        .new_create_resource_record_options("inst-1", "zone-1")
        .set("name", "www")
        .set("type", "A")
        .set("rdata", json!({"ip": "10.0.0.1"}))
        .set("ttl", 300);
    let created = client
        .create_resource_record(&opts)
        .unwrap()
        .result
        .unwrap()
        .result
        .unwrap();
    let id = created.id.clone().unwrap();
    assert_eq!(created.ttl, Some(300));

    // Step 2: list with a type filter.
    let listed = client
        .list_resource_records(
            &client
                .new_list_resource_records_options("inst-1", "zone-1")
                .set("type", "A"),
        )
        .unwrap()
        .result
        .unwrap();
    assert_eq!(listed.result.unwrap().len(), 1);
    assert_eq!(listed.result_info.unwrap().total_count, Some(1));

    // Step 3: get and update.
    let fetched = client
        .get_resource_record(&client.new_get_resource_record_options("inst-1", "zone-1", &id))
        .unwrap()
        .result
        .unwrap()
        .result
        .unwrap();
    assert_eq!(fetched, created);

    let updated = client
        .update_resource_record(
            &client
                .new_update_resource_record_options("inst-1", "zone-1", &id)
                .set("ttl", 60),
        )
        .unwrap()
        .result
        .unwrap()
        .result
        .unwrap();
    assert_eq!(updated.ttl, Some(60));
    assert_eq!(updated.name.as_deref(), Some("www"));

    // Step 4: delete leaves no body, then the record is gone.
    let deleted = client
        .delete_resource_record(&client.new_delete_resource_record_options("inst-1", "zone-1", &id))
        .unwrap();
    assert_eq!(deleted.status, 204);
    assert!(deleted.result.is_none());

    let err = client
        .get_resource_record(&client.new_get_resource_record_options("inst-1", "zone-1", &id))
        .unwrap_err();
    assert_eq!(err.status_code(), Some(404));
}

#[test]
fn load_balancer_events() {
    let client = GlobalLoadBalancerEventsV1::new(GlobalLoadBalancerEventsV1Options {
        url: Some(server()),
        authenticator: Some(Arc::new(NoAuthAuthenticator)),
        crn: CRN.to_string(),
    })
    .unwrap();

    let envelope = client
        .get_load_balancer_events(&client.new_get_load_balancer_events_options())
        .unwrap()
        .result
        .unwrap();
    let events = envelope.result.unwrap();
    assert_eq!(events.len(), 2);
    assert!(!events[0].origins[0].healthy);
    assert!(events[1].pool[0].healthy);
}

#[test]
fn security_events_follow_cursors() {
    let client = SecurityEventsApiV1::new(SecurityEventsApiV1Options {
        url: Some(server()),
        authenticator: Some(Arc::new(NoAuthAuthenticator)),
        crn: CRN.to_string(),
        zone_id: ZONE.to_string(),
    })
    .unwrap();

    let first = client
        .security_events(&client.new_security_events_options().set("limit", 4))
        .unwrap()
        .result
        .unwrap();
    assert_eq!(first.result.unwrap().len(), 4);
    assert_eq!(first.result_info.unwrap().next_cursor(), Some("c4"));

    let all = client
        .all_security_events(
            &Context::background(),
            &client.new_security_events_options().set("limit", 5),
        )
        .unwrap();
    assert_eq!(all.len(), 12);

    let drops = client
        .all_security_events(
            &Context::background(),
            &client.new_security_events_options().set("action", "drop"),
        )
        .unwrap();
    assert_eq!(drops.len(), 4);
    assert!(drops.iter().all(|e| e.action == "drop"));
}

#[test]
fn client_from_config_source() {
    let url = server();
    let source = MapSource::new()
        .set("BOT_MANAGEMENT_URL", url.as_str())
        .set("BOT_MANAGEMENT_AUTH_TYPE", "basic")
        .set("BOT_MANAGEMENT_USERNAME", "user")
        .set("BOT_MANAGEMENT_PASSWORD", "pass")
        .set("BOT_MANAGEMENT_ENABLE_RETRIES", "true")
        .set("BOT_MANAGEMENT_MAX_RETRIES", "2");
    let client = BotManagementV1::from_config(&source, CRN, ZONE).unwrap();
    assert_eq!(client.service_url(), url);
    assert_eq!(client.service().retry_policy().unwrap().max_retries, 2);

    let resp = client
        .get_bot_management(&client.new_get_bot_management_options())
        .unwrap();
    assert_eq!(resp.status, 200);
}

#[test]
fn clone_can_be_repointed_independently() {
    let url = server();
    let original = IpsApiV1::new(IpsApiV1Options {
        url: Some(url.clone()),
        authenticator: Some(Arc::new(NoAuthAuthenticator)),
    })
    .unwrap();
    let mut copy = original.clone();
    copy.set_service_url("http://127.0.0.1:9").unwrap();

    assert_eq!(original.service_url(), url);
    assert!(original.list_ips(&original.new_list_ips_options()).is_ok());
    assert!(Arc::ptr_eq(
        original.service().authenticator(),
        copy.service().authenticator()
    ));
}
