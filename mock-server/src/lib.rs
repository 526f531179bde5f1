//! In-memory stand-in for the CIS REST APIs.
//!
//! [`app`] serves every operation the client core knows about from a shared
//! in-memory store, wrapping results in the `{success, result, errors,
//! messages}` envelope. [`canned`] and [`flaky`] are fault-injection routers
//! for pipeline tests, and [`spawn`] runs any router on a random local port.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    extract::{Path, Query, State},
    http::header,
    routing::get,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, error};
use uuid::Uuid;

pub use axum::{http::StatusCode, Router};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotManagement {
    pub fight_mode: bool,
    pub session_score: bool,
    pub enable_js: bool,
    pub auth_id_logging: bool,
    pub use_latest_model: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateBotManagement {
    pub fight_mode: Option<bool>,
    pub session_score: Option<bool>,
    pub enable_js: Option<bool>,
    pub auth_id_logging: Option<bool>,
    pub use_latest_model: Option<bool>,
}

impl BotManagement {
    fn apply(&mut self, update: UpdateBotManagement) {
        let fields = [
            (&mut self.fight_mode, update.fight_mode),
            (&mut self.session_score, update.session_score),
            (&mut self.enable_js, update.enable_js),
            (&mut self.auth_id_logging, update.auth_id_logging),
            (&mut self.use_latest_model, update.use_latest_model),
        ];
        for (slot, value) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub ttl: i64,
    pub rdata: Value,
}

#[derive(Debug, Deserialize)]
pub struct CreateRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default)]
    pub rdata: Option<Value>,
    #[serde(default)]
    pub ttl: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRecord {
    pub name: Option<String>,
    pub rdata: Option<Value>,
    pub ttl: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ListRecords {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    #[serde(rename = "type")]
    pub record_type: Option<String>,
    pub name: Option<String>,
}

const DEFAULT_TTL: i64 = 900;
const DEFAULT_RECORD_LIMIT: usize = 200;
const DEFAULT_EVENT_LIMIT: usize = 10;

/// Everything the mock remembers, keyed by `(crn, zone)` or
/// `(instance_id, dnszone_id)`.
#[derive(Debug, Default)]
pub struct Store {
    pub bot_management: HashMap<(String, String), BotManagement>,
    pub smart_routing: HashMap<(String, String), String>,
    pub records: HashMap<(String, String), Vec<ResourceRecord>>,
}

pub type Db = Arc<RwLock<Store>>;

type Failure = (StatusCode, Json<Value>);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/v1/ips", get(list_ips))
        .route(
            "/v1/{crn}/zones/{zone_identifier}/bot_management",
            get(get_bot_management).put(update_bot_management),
        )
        .route(
            "/v1/{crn}/zones/{zone_identifier}/routing/smart_routing",
            get(get_smart_routing).patch(update_smart_routing),
        )
        .route(
            "/v1/{crn}/zones/{zone_identifier}/security/events",
            get(security_events),
        )
        .route("/v1/{crn}/load_balancers/events", get(load_balancer_events))
        .route(
            "/v1/instances/{instance_id}/dnszones/{dnszone_id}/resource_records",
            get(list_records).post(create_record),
        )
        .route(
            "/v1/instances/{instance_id}/dnszones/{dnszone_id}/resource_records/{record_id}",
            get(get_record).put(update_record).delete(delete_record),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Serve `router` on a random port of 127.0.0.1 from a background thread.
pub fn spawn(router: Router) -> std::io::Result<SocketAddr> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                error!(%err, "mock server runtime failed to start");
                return;
            }
        };
        runtime.block_on(async move {
            let served = match TcpListener::from_std(listener) {
                Ok(listener) => axum::serve(listener, router).await,
                Err(err) => Err(err),
            };
            if let Err(err) = served {
                error!(%addr, %err, "mock server stopped");
            }
        });
    });
    Ok(addr)
}

/// Answer every request with `status` and `body` after `delay`.
pub fn canned(status: StatusCode, body: impl Into<String>, delay: Duration) -> Router {
    let body: String = body.into();
    Router::new().fallback(move || {
        let body = body.clone();
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            (status, [(header::CONTENT_TYPE, "application/json")], body)
        }
    })
}

/// Fail the first `failures` requests with `status`, then answer `200` with
/// `body`. The returned counter holds the number of requests seen.
pub fn flaky(
    failures: usize,
    status: StatusCode,
    body: impl Into<String>,
) -> (Router, Arc<AtomicUsize>) {
    let body: String = body.into();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().fallback(move || {
        let body = body.clone();
        let counter = counter.clone();
        async move {
            let seen = counter.fetch_add(1, Ordering::SeqCst);
            if seen < failures {
                let failure = envelope_error(status, "1000", "transient failure");
                return (status, [(header::CONTENT_TYPE, "application/json")], failure.to_string());
            }
            (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], body)
        }
    });
    (router, hits)
}

fn success(result: Value) -> Json<Value> {
    Json(json!({
        "success": true,
        "result": result,
        "errors": [],
        "messages": [],
    }))
}

fn success_with_info(result: Value, info: Value) -> Json<Value> {
    Json(json!({
        "success": true,
        "result": result,
        "errors": [],
        "messages": [],
        "result_info": info,
    }))
}

fn envelope_error(status: StatusCode, code: &str, message: &str) -> Value {
    json!({
        "success": false,
        "result": null,
        "errors": [[code, message]],
        "messages": [[status.as_u16().to_string()]],
    })
}

fn failure(status: StatusCode, code: &str, message: impl AsRef<str>) -> Failure {
    (status, Json(envelope_error(status, code, message.as_ref())))
}

fn bad_request(err: serde_json::Error) -> Failure {
    failure(StatusCode::BAD_REQUEST, "1001", format!("invalid request body: {err}"))
}

// --- ips ---

async fn list_ips() -> Json<Value> {
    success(json!({
        "ipv4_cidrs": ["103.21.244.0/22", "172.64.0.0/13"],
        "ipv6_cidrs": ["2400:cb00::/32", "2606:4700::/32"],
    }))
}

// --- bot management ---

async fn get_bot_management(
    State(db): State<Db>,
    Path(key): Path<(String, String)>,
) -> Json<Value> {
    let store = db.read().await;
    let settings = store.bot_management.get(&key).cloned().unwrap_or_default();
    success(json!(settings))
}

async fn update_bot_management(
    State(db): State<Db>,
    Path(key): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Failure> {
    let update: UpdateBotManagement = serde_json::from_value(body).map_err(bad_request)?;
    let mut store = db.write().await;
    let settings = store.bot_management.entry(key).or_default();
    settings.apply(update);
    debug!(?settings, "bot management updated");
    Ok(success(json!(settings)))
}

// --- routing ---

#[derive(Debug, Deserialize)]
struct SmartRoutingUpdate {
    value: String,
}

fn smart_routing(value: &str) -> Value {
    json!({
        "id": "smart_routing",
        "value": value,
        "editable": true,
        "modified_on": "2024-01-01T00:00:00Z",
    })
}

async fn get_smart_routing(
    State(db): State<Db>,
    Path(key): Path<(String, String)>,
) -> Json<Value> {
    let store = db.read().await;
    let value = store.smart_routing.get(&key).map_or("off", String::as_str);
    success(smart_routing(value))
}

async fn update_smart_routing(
    State(db): State<Db>,
    Path(key): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Failure> {
    let update: SmartRoutingUpdate = serde_json::from_value(body).map_err(bad_request)?;
    if update.value != "on" && update.value != "off" {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "1007",
            format!("invalid value for smart_routing: {}", update.value),
        ));
    }
    db.write().await.smart_routing.insert(key, update.value.clone());
    Ok(success(smart_routing(&update.value)))
}

// --- load balancer events ---

async fn load_balancer_events(Path(crn): Path<String>) -> Json<Value> {
    debug!(%crn, "listing load balancer events");
    let events = json!([
        {
            "id": "f2d1b7c4-1a2b-4c3d-8e9f-000000000001",
            "timestamp": "2024-01-01T10:00:00Z",
            "pool": [{"id": "pool-1", "name": "primary", "healthy": false, "changed": true, "minimum_origins": 1}],
            "origins": [{"name": "origin-1", "address": "10.0.0.1", "ip": "10.0.0.1", "enabled": true, "healthy": false, "failure_reason": "HTTP timeout occurred", "changed": true}],
        },
        {
            "id": "f2d1b7c4-1a2b-4c3d-8e9f-000000000002",
            "timestamp": "2024-01-01T10:05:00Z",
            "pool": [{"id": "pool-1", "name": "primary", "healthy": true, "changed": true, "minimum_origins": 1}],
            "origins": [{"name": "origin-1", "address": "10.0.0.1", "ip": "10.0.0.1", "enabled": true, "healthy": true, "failure_reason": "No failures", "changed": true}],
        },
    ]);
    success_with_info(
        events,
        json!({"page": 1, "per_page": 20, "count": 2, "total_count": 2}),
    )
}

// --- security events ---

const EVENT_FILTERS: [&str; 15] = [
    "ip_class", "method", "scheme", "ip", "host", "proto", "uri", "ua", "colo", "ray_id", "kind",
    "action", "country", "source", "rule_id",
];

fn seeded_events() -> Vec<Value> {
    let actions = ["drop", "challenge", "log"];
    let countries = ["US", "DE", "JP"];
    (0..12)
        .map(|i| {
            let kind = if i % 4 == 3 { "ratelimit" } else { "firewall" };
            let action = actions[i % actions.len()];
            json!({
                "ray_id": format!("4c{i:014x}"),
                "kind": kind,
                "source": "waf",
                "action": action,
                "rule_id": format!("1000{}", i % 3),
                "ip": format!("198.51.100.{}", i + 1),
                "ip_class": "noRecord",
                "country": countries[i % countries.len()],
                "colo": "FRA",
                "host": "www.example.com",
                "method": "GET",
                "proto": "HTTP/1.1",
                "scheme": "https",
                "ua": "curl/8.0",
                "uri": "/login",
                "occurred_at": format!("2024-01-01T00:{i:02}:00Z"),
                "matches": [{"rule_id": format!("1000{}", i % 3), "source": "waf", "action": action}],
            })
        })
        .collect()
}

fn parse_cursor(cursor: &str) -> Option<usize> {
    cursor.strip_prefix('c')?.parse().ok()
}

async fn security_events(
    Path((crn, zone)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, Failure> {
    debug!(%crn, %zone, ?params, "listing security events");
    let limit = match params.get("limit") {
        Some(raw) => match raw.parse::<usize>() {
            Ok(limit) if (1..=1000).contains(&limit) => limit,
            _ => return Err(failure(StatusCode::BAD_REQUEST, "1004", format!("invalid limit: {raw}"))),
        },
        None => DEFAULT_EVENT_LIMIT,
    };
    let start = match params.get("cursor") {
        Some(raw) => parse_cursor(raw).ok_or_else(|| {
            failure(StatusCode::BAD_REQUEST, "1005", format!("invalid cursor: {raw}"))
        })?,
        None => 0,
    };
    let since = params.get("since").map(String::as_str);
    let until = params.get("until").map(String::as_str);

    let matching: Vec<Value> = seeded_events()
        .into_iter()
        .filter(|event| {
            EVENT_FILTERS.iter().all(|key| match params.get(*key) {
                Some(wanted) => event[*key].as_str() == Some(wanted.as_str()),
                None => true,
            })
        })
        .filter(|event| {
            let at = event["occurred_at"].as_str().unwrap_or_default();
            since.map_or(true, |s| at >= s) && until.map_or(true, |u| at <= u)
        })
        .collect();

    let page: Vec<Value> = matching.iter().skip(start).take(limit).cloned().collect();
    let next = start + page.len();
    let mut cursors = serde_json::Map::new();
    if next < matching.len() {
        cursors.insert("after".to_string(), json!(format!("c{next}")));
    }
    if let Some(before) = params.get("cursor") {
        cursors.insert("before".to_string(), json!(before));
    }
    let info = json!({
        "cursors": cursors,
        "scanned_range": {
            "since": since.unwrap_or("2024-01-01T00:00:00Z"),
            "until": until.unwrap_or("2024-01-01T00:59:00Z"),
        },
    });
    Ok(success_with_info(Value::Array(page), info))
}

// --- dns records ---

fn record_not_found(record_id: &str) -> Failure {
    failure(
        StatusCode::NOT_FOUND,
        "404",
        format!("resource record {record_id} not found"),
    )
}

async fn list_records(
    State(db): State<Db>,
    Path(key): Path<(String, String)>,
    Query(params): Query<ListRecords>,
) -> Json<Value> {
    let store = db.read().await;
    let records = store.records.get(&key).map(Vec::as_slice).unwrap_or_default();
    let matching: Vec<&ResourceRecord> = records
        .iter()
        .filter(|r| params.record_type.as_ref().map_or(true, |t| &r.record_type == t))
        .filter(|r| params.name.as_ref().map_or(true, |n| &r.name == n))
        .collect();
    let limit = params.limit.unwrap_or(DEFAULT_RECORD_LIMIT);
    let page: Vec<&ResourceRecord> = matching
        .iter()
        .skip(params.offset.unwrap_or(0))
        .take(limit)
        .copied()
        .collect();
    success_with_info(
        json!(page),
        json!({"per_page": limit, "count": page.len(), "total_count": matching.len()}),
    )
}

async fn create_record(
    State(db): State<Db>,
    Path(key): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Failure> {
    let input: CreateRecord = serde_json::from_value(body).map_err(bad_request)?;
    let record = ResourceRecord {
        id: Uuid::new_v4(),
        name: input.name.unwrap_or_else(|| "@".to_string()),
        record_type: input.record_type,
        ttl: input.ttl.unwrap_or(DEFAULT_TTL),
        rdata: input.rdata.unwrap_or_else(|| json!({})),
    };
    debug!(id = %record.id, name = %record.name, "resource record created");
    db.write()
        .await
        .records
        .entry(key)
        .or_default()
        .push(record.clone());
    Ok(success(json!(record)))
}

async fn get_record(
    State(db): State<Db>,
    Path((instance_id, dnszone_id, record_id)): Path<(String, String, String)>,
) -> Result<Json<Value>, Failure> {
    let store = db.read().await;
    let id = Uuid::parse_str(&record_id).map_err(|_| record_not_found(&record_id))?;
    store
        .records
        .get(&(instance_id, dnszone_id))
        .and_then(|records| records.iter().find(|r| r.id == id))
        .map(|record| success(json!(record)))
        .ok_or_else(|| record_not_found(&record_id))
}

async fn update_record(
    State(db): State<Db>,
    Path((instance_id, dnszone_id, record_id)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Failure> {
    let input: UpdateRecord = serde_json::from_value(body).map_err(bad_request)?;
    let id = Uuid::parse_str(&record_id).map_err(|_| record_not_found(&record_id))?;
    let mut store = db.write().await;
    let record = store
        .records
        .get_mut(&(instance_id, dnszone_id))
        .and_then(|records| records.iter_mut().find(|r| r.id == id))
        .ok_or_else(|| record_not_found(&record_id))?;
    if let Some(name) = input.name {
        record.name = name;
    }
    if let Some(rdata) = input.rdata {
        record.rdata = rdata;
    }
    if let Some(ttl) = input.ttl {
        record.ttl = ttl;
    }
    Ok(success(json!(record)))
}

async fn delete_record(
    State(db): State<Db>,
    Path((instance_id, dnszone_id, record_id)): Path<(String, String, String)>,
) -> Result<StatusCode, Failure> {
    let id = Uuid::parse_str(&record_id).map_err(|_| record_not_found(&record_id))?;
    let mut store = db.write().await;
    let records = store
        .records
        .get_mut(&(instance_id, dnszone_id))
        .ok_or_else(|| record_not_found(&record_id))?;
    let before = records.len();
    records.retain(|r| r.id != id);
    if records.len() == before {
        return Err(record_not_found(&record_id));
    }
    Ok(StatusCode::NO_CONTENT)
}
