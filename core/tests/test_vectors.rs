//! Verify request rendering and response decoding against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Each vector names an operation, the options and client parameters to
//! render it with, the expected request, a simulated response and either the
//! expected `result` of the envelope or the expected error. Bodies and
//! results are compared as parsed JSON so field order does not matter.

use cis_core::services::{bot_management, dns_records, ip_list, lb_events, routing, security_events};
use cis_core::{parse_response, DetailedResponse, Envelope, Error, HttpResponse, Operation};
use serde_json::Value;

const BASE_URL: &str = "https://api.cis.cloud.ibm.com";

/// Look up a static operation description by name.
fn operation(name: &str) -> &'static Operation {
    let all: [&'static Operation; 12] = [
        &bot_management::GET_BOT_MANAGEMENT,
        &bot_management::UPDATE_BOT_MANAGEMENT,
        &dns_records::LIST_RESOURCE_RECORDS,
        &dns_records::CREATE_RESOURCE_RECORD,
        &dns_records::GET_RESOURCE_RECORD,
        &dns_records::UPDATE_RESOURCE_RECORD,
        &dns_records::DELETE_RESOURCE_RECORD,
        &ip_list::LIST_IPS,
        &lb_events::GET_LOAD_BALANCER_EVENTS,
        &routing::GET_SMART_ROUTING,
        &routing::UPDATE_SMART_ROUTING,
        &security_events::SECURITY_EVENTS,
    ];
    all.into_iter()
        .find(|op| op.name == name)
        .unwrap_or_else(|| panic!("unknown operation: {name}"))
}

fn run_vectors(raw: &str) {
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let op = operation(case["operation"].as_str().unwrap());

        let mut options = op.options();
        for (field, value) in case["options"].as_object().unwrap() {
            options.insert(field, value.clone());
        }
        options.validate_for(op).unwrap();

        let params: Vec<(&str, &str)> = case["client_params"]
            .as_object()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str().unwrap()))
            .collect();

        // Verify build
        let expected_req = &case["expected_request"];
        let req = options.to_request(BASE_URL, &params, &[]).unwrap();
        assert_eq!(req.method.as_str(), expected_req["method"].as_str().unwrap(), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");

        for header in expected_req["headers"].as_array().unwrap() {
            let pair = header.as_array().unwrap();
            let (header_name, value) = (pair[0].as_str().unwrap(), pair[1].as_str().unwrap());
            assert_eq!(req.header(header_name), Some(value), "{name}: header {header_name}");
        }

        match &expected_req["body"] {
            Value::Null => assert!(req.body.is_none(), "{name}: body should be None"),
            expected => {
                let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(&body, expected, "{name}: body");
            }
        }

        // Verify parse
        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: sim["body"].as_str().unwrap().to_string(),
        };
        let result: cis_core::Result<DetailedResponse<Envelope<Value>>> = parse_response(response);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            let status = expected_error["status"].as_u64().unwrap() as u16;
            assert_eq!(err.response().map(|r| r.status), Some(status), "{name}: status");
            match expected_error["kind"].as_str().unwrap() {
                "Api" => {
                    assert!(matches!(err, Error::Api { .. }), "{name}: expected Api, got {err:?}");
                    assert_eq!(err.to_string(), expected_error["message"].as_str().unwrap(), "{name}: message");
                }
                "ResponseProcessing" => assert!(
                    matches!(err, Error::ResponseProcessing { .. }),
                    "{name}: expected ResponseProcessing, got {err:?}"
                ),
                other => panic!("{name}: unknown expected_error: {other}"),
            }
        } else {
            let resp = result.unwrap();
            let envelope_result = resp.result.and_then(|envelope| envelope.result);
            let expected = match &case["expected_result"] {
                Value::Null => None,
                other => Some(other.clone()),
            };
            assert_eq!(envelope_result, expected, "{name}: parsed result");
        }
    }
}

#[test]
fn bot_management_test_vectors() {
    run_vectors(include_str!("../../test-vectors/bot_management.json"));
}

#[test]
fn dns_records_test_vectors() {
    run_vectors(include_str!("../../test-vectors/dns_records.json"));
}

#[test]
fn routing_and_account_test_vectors() {
    run_vectors(include_str!("../../test-vectors/routing.json"));
}

#[test]
fn security_events_test_vectors() {
    run_vectors(include_str!("../../test-vectors/security_events.json"));
}
