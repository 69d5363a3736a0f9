//! In-memory stand-in for the vendor's video AI analytics API.
//!
//! Serves the five endpoints under `/artemis` with the vendor's envelope
//! (`code`, `msg`, `data`), checks credentials and the issued token, and
//! records every request so tests can assert on what went over the wire.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{OriginalUri, State},
    http::{header::AUTHORIZATION, HeaderMap, Method},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use url::form_urlencoded;

pub const PREFIX: &str = "/artemis";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub uid: String,
    pub device_id: String,
    pub name: String,
    pub dept_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: u64,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub device_id: String,
    pub warn_time: String,
}

/// One request as the server saw it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Clone)]
pub struct MockState {
    inner: Arc<Inner>,
}

struct Inner {
    phone: String,
    password: String,
    token: String,
    login_response: Option<Value>,
    devices: Vec<Device>,
    alerts: Vec<Alert>,
    subscriptions: RwLock<Vec<String>>,
    requests: RwLock<Vec<RecordedRequest>>,
}

impl MockState {
    /// Accepts `phone`/`password` and issues `token`.
    pub fn new(phone: &str, password: &str, token: &str) -> Self {
        Self::build(phone, password, token, None)
    }

    /// Answers every login with `response` instead of checking credentials.
    pub fn with_login_response(response: Value) -> Self {
        Self::build("", "", "", Some(response))
    }

    fn build(phone: &str, password: &str, token: &str, login_response: Option<Value>) -> Self {
        Self {
            inner: Arc::new(Inner {
                phone: phone.to_string(),
                password: password.to_string(),
                token: token.to_string(),
                login_response,
                devices: fixture_devices(),
                alerts: fixture_alerts(),
                subscriptions: RwLock::new(Vec::new()),
                requests: RwLock::new(Vec::new()),
            }),
        }
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.requests.read().await.clone()
    }

    /// For callers outside the runtime, e.g. a blocking test thread.
    pub fn requests_blocking(&self) -> Vec<RecordedRequest> {
        self.inner.requests.blocking_read().clone()
    }

    pub async fn subscriptions(&self) -> Vec<String> {
        self.inner.subscriptions.read().await.clone()
    }

    pub fn subscriptions_blocking(&self) -> Vec<String> {
        self.inner.subscriptions.blocking_read().clone()
    }

    async fn record(&self, method: Method, uri: &OriginalUri, headers: &HeaderMap, body: &str) {
        let request = RecordedRequest {
            method: method.to_string(),
            path: uri.0.path().to_string(),
            query: uri.0.query().map(str::to_string),
            authorization: header_str(headers, AUTHORIZATION.as_str()),
            body: body.to_string(),
        };
        self.inner.requests.write().await.push(request);
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        header_str(headers, AUTHORIZATION.as_str()).as_deref() == Some(self.inner.token.as_str())
    }
}

impl Default for MockState {
    fn default() -> Self {
        Self::new("13800000000", "123456", "mock-jwt-token")
    }
}

pub fn app(state: MockState) -> Router {
    let api = Router::new()
        .route("/auth/login/password", post(login))
        .route("/analysis/subscription", post(subscribe))
        .route("/analysis/analysiswarninfo/listPage", get(list_alerts))
        .route("/analysis/analysisdevice/getInfoByDept", get(list_devices))
        .route("/analysis/analysisdevice/getVideoByUid", get(video_stream));
    Router::new().nest(PREFIX, api).with_state(state)
}

pub async fn run(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

async fn login(
    State(state): State<MockState>,
    uri: OriginalUri,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    state.record(Method::POST, &uri, &headers, &body).await;
    if let Some(response) = &state.inner.login_response {
        return Json(response.clone());
    }

    let form = pairs(&body);
    let phone = form.get("phone").map(String::as_str);
    let password = form.get("password").map(String::as_str);
    if phone == Some(state.inner.phone.as_str()) && password == Some(state.inner.password.as_str()) {
        tracing::info!(phone = phone.unwrap_or_default(), "login accepted");
        return ok(json!({ "jwtToken": state.inner.token }));
    }
    fail("401", "invalid phone or password")
}

async fn subscribe(
    State(state): State<MockState>,
    uri: OriginalUri,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    state.record(Method::POST, &uri, &headers, &body).await;
    if !state.authorized(&headers) {
        return fail("401", "token invalid");
    }

    let form = pairs(&body);
    let Some(url) = form.get("url") else {
        return fail("400", "url is required");
    };
    let mut subscriptions = state.inner.subscriptions.write().await;
    match form.get("type").map(String::as_str) {
        Some("1") => {
            if !subscriptions.contains(url) {
                subscriptions.push(url.clone());
            }
        }
        Some("2") => subscriptions.retain(|existing| existing != url),
        _ => return fail("400", "type must be 1 or 2"),
    }
    ok(Value::Null)
}

async fn list_alerts(
    State(state): State<MockState>,
    uri: OriginalUri,
    headers: HeaderMap,
) -> Json<Value> {
    state.record(Method::GET, &uri, &headers, "").await;
    if !state.authorized(&headers) {
        return fail("401", "token invalid");
    }

    let query = pairs(uri.0.query().unwrap_or_default());
    let (Some(alert_type), Some(device_id)) = (query.get("type"), query.get("deviceId")) else {
        return fail("400", "type and deviceId are required");
    };
    let matching: Vec<&Alert> = state
        .inner
        .alerts
        .iter()
        .filter(|a| &a.alert_type == alert_type && &a.device_id == device_id)
        .filter(|a| within(&a.warn_time, query.get("startDateTime"), query.get("endDateTime")))
        .collect();
    page(&matching, &query)
}

async fn list_devices(
    State(state): State<MockState>,
    uri: OriginalUri,
    headers: HeaderMap,
) -> Json<Value> {
    state.record(Method::GET, &uri, &headers, "").await;
    if !state.authorized(&headers) {
        return fail("401", "token invalid");
    }

    let query = pairs(uri.0.query().unwrap_or_default());
    let matching: Vec<&Device> = state
        .inner
        .devices
        .iter()
        .filter(|d| query.get("name").map_or(true, |name| d.name.contains(name.as_str())))
        .filter(|d| query.get("deviceId").map_or(true, |id| &d.device_id == id))
        .collect();
    page(&matching, &query)
}

async fn video_stream(
    State(state): State<MockState>,
    uri: OriginalUri,
    headers: HeaderMap,
) -> Json<Value> {
    state.record(Method::GET, &uri, &headers, "").await;
    if !state.authorized(&headers) {
        return fail("401", "token invalid");
    }

    let query = pairs(uri.0.query().unwrap_or_default());
    let uid = query.get("uid").map(String::as_str).unwrap_or_default();
    if state.inner.devices.iter().any(|d| d.uid == uid) {
        return ok(json!({ "uid": uid, "url": format!("rtsp://mock-nvr:554/live/{uid}") }));
    }
    fail("404", "device not found")
}

fn ok(data: Value) -> Json<Value> {
    if data.is_null() {
        return Json(json!({ "code": "200", "msg": "success" }));
    }
    Json(json!({ "code": "200", "msg": "success", "data": data }))
}

fn fail(code: &str, msg: &str) -> Json<Value> {
    Json(json!({ "code": code, "msg": msg }))
}

/// `startPage` is 1-based. Missing or malformed paging values fall back to
/// the first page of ten.
fn page<T: Serialize>(items: &[T], query: &HashMap<String, String>) -> Json<Value> {
    let start_page = query.get("startPage").and_then(|v| v.parse::<usize>().ok()).unwrap_or(1).max(1);
    let page_size = query.get("pageSize").and_then(|v| v.parse::<usize>().ok()).unwrap_or(10).max(1);
    let rows: Vec<&T> = items.iter().skip((start_page - 1) * page_size).take(page_size).collect();
    ok(json!({
        "total": items.len(),
        "startPage": start_page,
        "pageSize": page_size,
        "list": rows,
    }))
}

/// `yyMMdd` strings compare correctly as text.
fn within(date: &str, start: Option<&String>, end: Option<&String>) -> bool {
    let Some(start) = start else {
        return true;
    };
    let day = &date[..date.len().min(6)];
    day >= start.as_str() && end.map_or(true, |end| day <= end.as_str())
}

fn pairs(raw: &str) -> HashMap<String, String> {
    form_urlencoded::parse(raw.as_bytes()).into_owned().collect()
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

fn fixture_devices() -> Vec<Device> {
    [
        ("u-100", "D-100", "North gate camera", "Security"),
        ("u-101", "D-101", "South gate camera", "Security"),
        ("u-200", "D-200", "Warehouse aisle 3", "Logistics"),
    ]
    .into_iter()
    .map(|(uid, device_id, name, dept)| Device {
        uid: uid.to_string(),
        device_id: device_id.to_string(),
        name: name.to_string(),
        dept_name: dept.to_string(),
    })
    .collect()
}

fn fixture_alerts() -> Vec<Alert> {
    [
        (1, "1", "D-100", "230701083000"),
        (2, "1", "D-100", "230705120000"),
        (3, "2", "D-100", "230706090000"),
        (4, "1", "D-100", "230802101500"),
        (5, "1", "D-200", "230703160000"),
    ]
    .into_iter()
    .map(|(id, alert_type, device_id, warn_time)| Alert {
        id,
        alert_type: alert_type.to_string(),
        device_id: device_id.to_string(),
        warn_time: warn_time.to_string(),
    })
    .collect()
}
