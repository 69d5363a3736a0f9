//! Request orchestration for the video AI analytics API.
//!
//! # Design
//! Every operation is one round trip: `build_*` turns its inputs into an
//! `HttpRequest`, the client's `Transport` executes it, and
//! `parse_envelope` turns the `HttpResponse` into an `Envelope` or an error.
//! Build and parse are public so a caller doing its own IO can use them
//! without a transport.
//!
//! The only state shared between calls is the cached token. `authenticate`
//! does not hold the token lock across the login round trip, so two threads
//! authenticating at once may both log in; the last token written wins.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::config::Config;
use crate::envelope::Envelope;
use crate::error::{AuthFailure, ClientError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, AUTHORIZATION, CONTENT_TYPE, FORM_URLENCODED};
use crate::listener::AuthListener;
use crate::logger::{LogLevel, Logger, NoopLogger};
use crate::params::Params;
use crate::transport::UreqTransport;
use crate::types::{AlertQuery, DeviceQuery, SubscriptionType};

pub const PATH_AUTH: &str = "/auth/login/password";
pub const PATH_SUBSCRIBE: &str = "/analysis/subscription";
pub const PATH_ALERT_HISTORY: &str = "/analysis/analysiswarninfo/listPage";
pub const PATH_DEVICE_INFO: &str = "/analysis/analysisdevice/getInfoByDept";
pub const PATH_VIDEO_STREAM: &str = "/analysis/analysisdevice/getVideoByUid";

pub const DEFAULT_NAME: &str = "Default";

/// Blocking client for the video AI analytics API.
///
/// `Send + Sync`; share one instance (e.g. behind an `Arc`) so calls reuse
/// the transport's connection pool and the cached token.
pub struct VideoAiClient {
    name: String,
    config: Config,
    transport: Box<dyn Transport>,
    token: RwLock<Option<String>>,
    listener: Option<Box<dyn AuthListener>>,
    logger: Arc<dyn Logger>,
}

impl VideoAiClient {
    /// A client with the default `ureq` transport and no logging.
    pub fn new(config: Config) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: Config) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    pub fn has_token(&self) -> bool {
        self.token.read().is_some()
    }

    /// Inject a token obtained elsewhere, e.g. restored from storage.
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    /// Forget the cached token so the next `authenticate` logs in again.
    pub fn clear_token(&self) {
        *self.token.write() = None;
    }

    // ---------------------------------------------------------------------
    // Operations
    // ---------------------------------------------------------------------

    /// Log in and cache the issued token.
    ///
    /// Does nothing when a token is already cached. On success the
    /// registered `AuthListener`, if any, receives the full login envelope.
    pub fn authenticate(&self, phone: &str, password: &str) -> Result<(), ClientError> {
        if self.has_token() {
            return Ok(());
        }

        let envelope = self.request_auth(phone, password)?;
        if envelope.data().is_none() {
            return Err(self.auth_failed(AuthFailure::MissingData, phone, envelope));
        }
        let Some(token) = envelope.jwt_token().map(str::to_string) else {
            return Err(self.auth_failed(AuthFailure::MissingToken, phone, envelope));
        };

        *self.token.write() = Some(token);
        if let Some(listener) = &self.listener {
            listener.on_authenticated(&envelope);
        }
        Ok(())
    }

    /// `authenticate` with the credentials from `Config`.
    pub fn login(&self) -> Result<(), ClientError> {
        self.authenticate(&self.config.phone, &self.config.password)
    }

    /// The raw login round trip. Leaves the cached token alone.
    pub fn request_auth(&self, phone: &str, password: &str) -> Result<Envelope, ClientError> {
        self.call(HttpMethod::Post, PATH_AUTH, &auth_params(phone, password))
    }

    /// Register (`Subscribe`) or remove (`Unsubscribe`) a webhook URL that
    /// receives alert pushes.
    pub fn subscribe(&self, url: &str, kind: SubscriptionType) -> Result<Envelope, ClientError> {
        self.call(HttpMethod::Post, PATH_SUBSCRIBE, &subscribe_params(url, kind))
    }

    /// One page of alert history.
    pub fn list_alerts(&self, query: &AlertQuery) -> Result<Envelope, ClientError> {
        self.call(HttpMethod::Get, PATH_ALERT_HISTORY, &query.to_params())
    }

    /// One page of devices visible to the account.
    pub fn list_devices(&self, query: &DeviceQuery) -> Result<Envelope, ClientError> {
        self.call(HttpMethod::Get, PATH_DEVICE_INFO, &query.to_params())
    }

    /// The live stream address of the device with `uid`.
    pub fn get_video_stream(&self, uid: &str) -> Result<Envelope, ClientError> {
        self.call(HttpMethod::Get, PATH_VIDEO_STREAM, &video_stream_params(uid))
    }

    // ---------------------------------------------------------------------
    // Build / parse
    // ---------------------------------------------------------------------

    pub fn build_auth(&self, phone: &str, password: &str) -> HttpRequest {
        self.build_request(HttpMethod::Post, PATH_AUTH, &auth_params(phone, password))
    }

    pub fn build_subscribe(&self, url: &str, kind: SubscriptionType) -> HttpRequest {
        self.build_request(HttpMethod::Post, PATH_SUBSCRIBE, &subscribe_params(url, kind))
    }

    pub fn build_list_alerts(&self, query: &AlertQuery) -> HttpRequest {
        self.build_request(HttpMethod::Get, PATH_ALERT_HISTORY, &query.to_params())
    }

    pub fn build_list_devices(&self, query: &DeviceQuery) -> HttpRequest {
        self.build_request(HttpMethod::Get, PATH_DEVICE_INFO, &query.to_params())
    }

    pub fn build_video_stream(&self, uid: &str) -> HttpRequest {
        self.build_request(HttpMethod::Get, PATH_VIDEO_STREAM, &video_stream_params(uid))
    }

    /// GET parameters go into the query string, POST parameters into a form
    /// body. The cached token, if any, is sent verbatim as `Authorization`.
    pub fn build_request(&self, method: HttpMethod, path: &str, params: &Params) -> HttpRequest {
        let mut headers = vec![(CONTENT_TYPE.to_string(), FORM_URLENCODED.to_string())];
        if let Some(token) = self.token.read().as_deref() {
            headers.push((AUTHORIZATION.to_string(), token.to_string()));
        }

        let (url, body) = match method {
            HttpMethod::Get => {
                let query = params.query_string(self.config.escape_query_values);
                (format!("{}{query}", self.config.endpoint_url(path)), None)
            }
            HttpMethod::Post => {
                let body = params.form_body(&self.config.charset);
                (self.config.endpoint_url(path), Some(body))
            }
        };

        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }

    /// Decode the body and unwrap the envelope.
    pub fn parse_envelope(&self, response: &HttpResponse) -> Result<Envelope, ClientError> {
        check_envelope(&response.text(&self.config.charset))
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn call(&self, method: HttpMethod, path: &str, params: &Params) -> Result<Envelope, ClientError> {
        let request = self.build_request(method, path, params);
        if self.logger.enabled(LogLevel::Debug) {
            let headers = MaskedHeaders(&request.headers);
            self.log(
                LogLevel::Debug,
                "sending request",
                &[
                    ("method", &method.as_str()),
                    ("url", &request.url),
                    ("headers", &headers),
                    ("params", params),
                ],
            );
        }

        let result = self.transport.execute(&request).map_err(ClientError::from).and_then(|response| {
            let text = response.text(&self.config.charset);
            if self.logger.enabled(LogLevel::Debug) {
                let content = mask_token(&text);
                self.log(
                    LogLevel::Debug,
                    "received response",
                    &[("path", &path), ("params", params), ("status", &response.status), ("content", &content)],
                );
            }
            check_envelope(&text)
        });

        if let Err(err) = &result {
            self.log(
                LogLevel::Info,
                "request failed",
                &[("path", &path), ("params", params), ("error", err)],
            );
        }
        result
    }

    fn auth_failed(&self, reason: AuthFailure, phone: &str, envelope: Envelope) -> ClientError {
        self.log(
            LogLevel::Warn,
            "authentication failed",
            &[("path", &PATH_AUTH), ("reason", &reason), ("phone", &phone), ("response", &envelope)],
        );
        ClientError::Auth { reason, envelope }
    }

    fn log(&self, level: LogLevel, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        if !self.logger.enabled(level) {
            return;
        }
        let mut all: Vec<(&str, &dyn fmt::Display)> = Vec::with_capacity(fields.len() + 1);
        all.push(("client", &self.name));
        all.extend_from_slice(fields);
        self.logger.log(level, message, &all);
    }
}

impl fmt::Debug for VideoAiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoAiClient")
            .field("name", &self.name)
            .field("base_url", &self.config.endpoint_url(""))
            .field("has_token", &self.has_token())
            .finish_non_exhaustive()
    }
}

/// Map an envelope whose `code` is not `"200"` to `ClientError::Api`.
fn check_envelope(text: &str) -> Result<Envelope, ClientError> {
    let envelope = Envelope::from_json(text)?;
    if envelope.is_success() {
        return Ok(envelope);
    }
    Err(ClientError::Api {
        code: envelope.code().unwrap_or_default(),
        message: envelope.msg().unwrap_or_default().to_string(),
    })
}

/// Response body for logs, with any `data.jwtToken` replaced by `***`.
fn mask_token(text: &str) -> Cow<'_, str> {
    let Ok(mut body) = serde_json::from_str::<Value>(text) else {
        return Cow::Borrowed(text);
    };
    match body.get_mut("data").and_then(|data| data.get_mut("jwtToken")) {
        Some(token) => {
            *token = Value::from("***");
            Cow::Owned(body.to_string())
        }
        None => Cow::Borrowed(text),
    }
}

fn auth_params(phone: &str, password: &str) -> Params {
    Params::new().with("phone", phone).with("password", password)
}

fn subscribe_params(url: &str, kind: SubscriptionType) -> Params {
    Params::new().with("url", url).with("type", kind.as_str())
}

fn video_stream_params(uid: &str) -> Params {
    Params::new().with("uid", uid)
}

/// Renders headers for logs with the token hidden.
struct MaskedHeaders<'a>(&'a [(String, String)]);

impl fmt::Display for MaskedHeaders<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if name.eq_ignore_ascii_case(AUTHORIZATION) {
                write!(f, "{name}: ***")?;
            } else {
                write!(f, "{name}: {value}")?;
            }
        }
        Ok(())
    }
}

/// Builder for [`VideoAiClient`].
pub struct ClientBuilder {
    config: Config,
    name: String,
    transport: Option<Box<dyn Transport>>,
    token: Option<String>,
    listener: Option<Box<dyn AuthListener>>,
    logger: Arc<dyn Logger>,
}

impl ClientBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            name: DEFAULT_NAME.to_string(),
            transport: None,
            token: None,
            listener: None,
            logger: Arc::new(NoopLogger),
        }
    }

    /// Label used in log output to tell several clients apart.
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Replace the default `UreqTransport`.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Start with a token already cached.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn auth_listener(mut self, listener: impl AuthListener + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    pub fn shared_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn build(self) -> VideoAiClient {
        let transport: Box<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Box::new(UreqTransport::new(&self.config.timeouts)),
        };
        VideoAiClient {
            name: self.name,
            config: self.config,
            transport,
            token: RwLock::new(self.token),
            listener: self.listener,
            logger: self.logger,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use parking_lot::Mutex;

    use super::*;
    use crate::error::TransportError;

    const BASE: &str = "http://10.0.0.5:8080/artemis";

    /// Replays canned bodies in order and records every request.
    #[derive(Clone, Default)]
    struct StubTransport {
        responses: Arc<Mutex<VecDeque<HttpResponse>>>,
        requests: Arc<Mutex<Vec<HttpRequest>>>,
    }

    impl StubTransport {
        fn reply(self, body: &str) -> Self {
            self.responses.lock().push_back(HttpResponse {
                status: 200,
                headers: vec![("Content-Type".to_string(), "application/json".to_string())],
                body: body.as_bytes().to_vec(),
            });
            self
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().clone()
        }
    }

    impl Transport for StubTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.requests.lock().push(request.clone());
            self.responses
                .lock()
                .pop_front()
                .ok_or_else(|| TransportError::request(&request.url, "connection refused"))
        }
    }

    #[derive(Default)]
    struct CaptureLogger {
        lines: Mutex<Vec<(LogLevel, String)>>,
    }

    impl Logger for CaptureLogger {
        fn log(&self, level: LogLevel, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
            let rendered: Vec<String> = fields.iter().map(|(k, v)| format!("{k}={v}")).collect();
            self.lines.lock().push((level, format!("{message} {}", rendered.join(" "))));
        }
    }

    fn config() -> Config {
        Config::new("http://10.0.0.5", 8080, "13800000000", "secret")
    }

    fn client_with(stub: &StubTransport) -> VideoAiClient {
        VideoAiClient::builder(config()).transport(stub.clone()).build()
    }

    #[test]
    fn build_video_stream_produces_get_with_query() {
        let req = VideoAiClient::new(config()).build_video_stream("abc123");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, format!("{BASE}/analysis/analysisdevice/getVideoByUid?&uid=abc123"));
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/x-www-form-urlencoded".to_string())]
        );
        assert!(req.body.is_none());
    }

    #[test]
    fn build_subscribe_produces_form_post() {
        let req = VideoAiClient::new(config()).build_subscribe("http://h/api", SubscriptionType::Subscribe);
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, format!("{BASE}/analysis/subscription"));
        assert_eq!(req.body.as_deref(), Some("url=http%3A%2F%2Fh%2Fapi&type=1"));
    }

    #[test]
    fn build_subscribe_encodes_form_in_configured_charset() {
        let client = VideoAiClient::new(config().with_charset("GBK"));
        let req = client.build_subscribe("http://h/设备", SubscriptionType::Subscribe);
        assert_eq!(req.body.as_deref(), Some("url=http%3A%2F%2Fh%2F%C9%E8%B1%B8&type=1"));
    }

    #[test]
    fn build_auth_posts_credentials() {
        let req = VideoAiClient::new(config()).build_auth("p", "pw");
        assert_eq!(req.url, format!("{BASE}/auth/login/password"));
        assert_eq!(req.body.as_deref(), Some("phone=p&password=pw"));
        assert!(req.header(AUTHORIZATION).is_none());
    }

    #[test]
    fn build_list_devices_omits_absent_filters() {
        let req = VideoAiClient::new(config()).build_list_devices(&DeviceQuery::new(1, 10).device_id("D-9"));
        assert_eq!(
            req.url,
            format!("{BASE}/analysis/analysisdevice/getInfoByDept?&deviceId=D-9&startPage=1&pageSize=10")
        );
    }

    #[test]
    fn build_list_alerts_escapes_when_configured() {
        let client = VideoAiClient::new(config().with_escaped_query_values(true));
        let query = AlertQuery::new("a b", "D-1", 1, 10);
        let req = client.build_list_alerts(&query);
        assert_eq!(
            req.url,
            format!("{BASE}/analysis/analysiswarninfo/listPage?&type=a+b&deviceId=D-1&startPage=1&pageSize=10")
        );
    }

    #[test]
    fn cached_token_is_sent_verbatim() {
        let client = VideoAiClient::builder(config()).token("T1").build();
        let req = client.build_video_stream("u1");
        assert_eq!(req.header(AUTHORIZATION), Some("T1"));
    }

    #[test]
    fn authenticate_caches_token() {
        let stub = StubTransport::default().reply(r#"{"code":"200","msg":"ok","data":{"jwtToken":"T1"}}"#);
        let client = client_with(&stub);

        client.authenticate("p", "pw").unwrap();

        assert_eq!(client.token().as_deref(), Some("T1"));
        let requests = stub.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].body.as_deref(), Some("phone=p&password=pw"));
    }

    #[test]
    fn authenticate_is_a_noop_once_token_cached() {
        let stub = StubTransport::default().reply(r#"{"code":"200","data":{"jwtToken":"T1"}}"#);
        let client = client_with(&stub);

        client.authenticate("p", "pw").unwrap();
        client.authenticate("p", "pw").unwrap();

        assert_eq!(stub.requests().len(), 1);
        assert_eq!(client.token().as_deref(), Some("T1"));
    }

    #[test]
    fn authenticate_skips_network_for_injected_token() {
        let stub = StubTransport::default();
        let client = VideoAiClient::builder(config()).transport(stub.clone()).token("X").build();
        client.authenticate("p", "pw").unwrap();
        assert!(stub.requests().is_empty());
    }

    #[test]
    fn clear_token_forces_new_login() {
        let stub = StubTransport::default()
            .reply(r#"{"code":"200","data":{"jwtToken":"T1"}}"#)
            .reply(r#"{"code":"200","data":{"jwtToken":"T2"}}"#);
        let client = client_with(&stub);

        client.authenticate("p", "pw").unwrap();
        client.clear_token();
        assert!(!client.has_token());
        client.authenticate("p", "pw").unwrap();

        assert_eq!(client.token().as_deref(), Some("T2"));
        assert_eq!(stub.requests().len(), 2);
    }

    #[test]
    fn authenticate_fails_without_data() {
        let stub = StubTransport::default().reply(r#"{"code":"200"}"#);
        let client = client_with(&stub);

        let err = client.authenticate("p", "pw").unwrap_err();
        match err {
            ClientError::Auth { reason, envelope } => {
                assert_eq!(reason, AuthFailure::MissingData);
                assert_eq!(envelope.code().as_deref(), Some("200"));
            }
            other => panic!("expected auth error, got {other:?}"),
        }
        assert!(client.token().is_none());
    }

    #[test]
    fn authenticate_fails_without_token() {
        let stub = StubTransport::default().reply(r#"{"code":"200","data":{}}"#);
        let client = client_with(&stub);

        let err = client.authenticate("p", "pw").unwrap_err();
        assert!(matches!(
            err,
            ClientError::Auth {
                reason: AuthFailure::MissingToken,
                ..
            }
        ));
        assert!(client.token().is_none());
    }

    #[test]
    fn authenticate_propagates_api_error() {
        let stub = StubTransport::default().reply(r#"{"code":"401","msg":"wrong password"}"#);
        let client = client_with(&stub);

        let err = client.authenticate("p", "bad").unwrap_err();
        assert!(matches!(err, ClientError::Api { ref code, .. } if code == "401"));
        assert_eq!(err.message(), "wrong password");
    }

    #[test]
    fn listener_receives_login_envelope_once() {
        let seen: Arc<Mutex<Vec<Envelope>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let stub = StubTransport::default().reply(r#"{"code":"200","msg":"ok","data":{"jwtToken":"T1","expire":3600}}"#);
        let client = VideoAiClient::builder(config())
            .transport(stub.clone())
            .auth_listener(move |env: &Envelope| sink.lock().push(env.clone()))
            .build();

        client.authenticate("p", "pw").unwrap();
        client.authenticate("p", "pw").unwrap();

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].jwt_token(), Some("T1"));
        assert_eq!(seen[0].data_object().unwrap()["expire"], 3600);
    }

    #[test]
    fn listener_not_called_on_failed_login() {
        let calls: Arc<Mutex<usize>> = Arc::default();
        let counter = Arc::clone(&calls);
        let stub = StubTransport::default().reply(r#"{"code":"200","data":{}}"#);
        let client = VideoAiClient::builder(config())
            .transport(stub.clone())
            .auth_listener(move |_: &Envelope| *counter.lock() += 1)
            .build();

        assert!(client.authenticate("p", "pw").is_err());
        assert_eq!(*calls.lock(), 0);
    }

    #[test]
    fn login_uses_configured_credentials() {
        let stub = StubTransport::default().reply(r#"{"code":"200","data":{"jwtToken":"T1"}}"#);
        let client = client_with(&stub);
        client.login().unwrap();
        assert_eq!(stub.requests()[0].body.as_deref(), Some("phone=13800000000&password=secret"));
    }

    #[test]
    fn request_auth_leaves_token_alone() {
        let stub = StubTransport::default().reply(r#"{"code":"200","data":{"jwtToken":"T1"}}"#);
        let client = client_with(&stub);
        let env = client.request_auth("p", "pw").unwrap();
        assert_eq!(env.jwt_token(), Some("T1"));
        assert!(!client.has_token());
    }

    #[test]
    fn operations_return_the_whole_envelope() {
        let body = r#"{"code":"200","msg":"success","data":{"total":1,"rows":[{"uid":"u1"}]}}"#;
        let expected = Envelope::from_json(body).unwrap();
        let stub = StubTransport::default().reply(body).reply(body).reply(body).reply(body);
        let client = client_with(&stub);

        assert_eq!(client.list_alerts(&AlertQuery::new("1", "D-1", 1, 10)).unwrap(), expected);
        assert_eq!(client.list_devices(&DeviceQuery::new(1, 10)).unwrap(), expected);
        assert_eq!(client.get_video_stream("u1").unwrap(), expected);
        assert_eq!(client.subscribe("http://h/api", SubscriptionType::Unsubscribe).unwrap(), expected);

        let methods: Vec<HttpMethod> = stub.requests().iter().map(|r| r.method).collect();
        assert_eq!(methods, [HttpMethod::Get, HttpMethod::Get, HttpMethod::Get, HttpMethod::Post]);
    }

    #[test]
    fn non_success_code_is_api_error_for_every_operation() {
        let body = r#"{"code":"500","msg":"device offline"}"#;
        let stub = StubTransport::default().reply(body).reply(body).reply(body).reply(body);
        let client = client_with(&stub);

        let errors = [
            client.list_alerts(&AlertQuery::new("1", "D-1", 1, 10)).unwrap_err(),
            client.list_devices(&DeviceQuery::new(1, 10)).unwrap_err(),
            client.get_video_stream("u1").unwrap_err(),
            client.subscribe("http://h/api", SubscriptionType::Subscribe).unwrap_err(),
        ];
        for err in errors {
            assert!(matches!(err, ClientError::Api { .. }));
            assert_eq!(err.message(), "device offline");
        }
    }

    #[test]
    fn missing_msg_gives_empty_message() {
        let stub = StubTransport::default().reply(r#"{"code":"403"}"#);
        let err = client_with(&stub).get_video_stream("u1").unwrap_err();
        assert_eq!(err.message(), "");
    }

    #[test]
    fn transport_failure_is_wrapped() {
        let stub = StubTransport::default();
        let err = client_with(&stub).get_video_stream("u1").unwrap_err();
        assert!(matches!(err, ClientError::Transport(TransportError::Request { .. })));
    }

    #[test]
    fn malformed_body_is_transport_error() {
        let stub = StubTransport::default().reply("<html>502 Bad Gateway</html>");
        let err = client_with(&stub).get_video_stream("u1").unwrap_err();
        assert!(matches!(err, ClientError::Transport(TransportError::Json(_))));
    }

    #[test]
    fn parse_envelope_uses_configured_charset() {
        let client = VideoAiClient::new(config().with_charset("GBK"));
        let mut body = br#"{"code":"200","data":{"name":""#.to_vec();
        body.extend_from_slice(&[0xC9, 0xE8, 0xB1, 0xB8]);
        body.extend_from_slice(br#""}}"#);
        let response = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body,
        };
        let env = client.parse_envelope(&response).unwrap();
        assert_eq!(env.data_str("name"), Some("设备"));
    }

    #[test]
    fn failures_are_logged_with_path_and_masked_params() {
        let logger = Arc::new(CaptureLogger::default());
        let stub = StubTransport::default().reply(r#"{"code":"401","msg":"bad"}"#);
        let client = VideoAiClient::builder(config())
            .name("site-a")
            .transport(stub)
            .shared_logger(logger.clone())
            .build();

        let _ = client.authenticate("p", "pw");

        let lines = logger.lines.lock();
        let (level, line) = lines.iter().find(|(_, l)| l.starts_with("request failed")).unwrap();
        assert_eq!(*level, LogLevel::Info);
        assert!(line.contains("client=site-a"));
        assert!(line.contains("path=/auth/login/password"));
        assert!(line.contains("password=***"));
        assert!(!line.contains("pw}"));
    }

    #[test]
    fn debug_log_hides_authorization() {
        let logger = Arc::new(CaptureLogger::default());
        let stub = StubTransport::default().reply(r#"{"code":"200","data":{}}"#);
        let client = VideoAiClient::builder(config())
            .transport(stub)
            .token("SECRET-TOKEN")
            .shared_logger(logger.clone())
            .build();

        client.get_video_stream("u1").unwrap();

        let lines = logger.lines.lock();
        assert!(lines.iter().any(|(_, l)| l.contains("authorization: ***")));
        assert!(lines.iter().all(|(_, l)| !l.contains("SECRET-TOKEN")));
    }

    #[test]
    fn auth_failure_logged_at_warn() {
        let logger = Arc::new(CaptureLogger::default());
        let stub = StubTransport::default().reply(r#"{"code":"200"}"#);
        let client = VideoAiClient::builder(config())
            .transport(stub)
            .shared_logger(logger.clone())
            .build();

        let _ = client.authenticate("p", "pw");

        let lines = logger.lines.lock();
        let (_, line) = lines.iter().find(|(level, _)| *level == LogLevel::Warn).unwrap();
        assert!(line.contains("path=/auth/login/password"));
        assert!(line.contains("reason=data not found"));
    }

    #[test]
    fn debug_log_masks_issued_token() {
        let logger = Arc::new(CaptureLogger::default());
        let stub = StubTransport::default().reply(r#"{"code":"200","msg":"ok","data":{"jwtToken":"T-SECRET"}}"#);
        let client = VideoAiClient::builder(config())
            .transport(stub)
            .shared_logger(logger.clone())
            .build();

        client.login().unwrap();
        assert_eq!(client.token().as_deref(), Some("T-SECRET"));

        let lines = logger.lines.lock();
        let (_, line) = lines.iter().find(|(_, l)| l.starts_with("received response")).unwrap();
        assert!(line.contains(r#"content={"code":"200","msg":"ok","data":{"jwtToken":"***"}}"#));
        assert!(lines.iter().all(|(_, l)| !l.contains("T-SECRET")));
    }

    #[test]
    fn mask_token_leaves_other_bodies_alone() {
        let body = r#"{"code":"200","data":{"url":"rtsp://x"}}"#;
        assert_eq!(mask_token(body), body);
        assert_eq!(mask_token("<html>"), "<html>");
    }

    #[test]
    fn client_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VideoAiClient>();
    }
}
