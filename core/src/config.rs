//! Connection settings for a `VideoAiClient`.
//!
//! # Design
//! `Config` is plain data. It derives serde so a host application can embed
//! it in its own configuration file; every field except the host, port and
//! credentials has a default. Once handed to the client it is read-only.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_URL_PREFIX: &str = "/artemis";
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Per-call timeouts applied by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Time allowed to get the request onto a connection.
    #[serde(with = "millis")]
    pub connection_request: Duration,
    /// Time allowed to wait for the response head once the request is sent.
    #[serde(with = "millis")]
    pub socket: Duration,
    #[serde(with = "millis")]
    pub connect: Duration,
    /// Cap on reading the whole response body. Unbounded when `None`.
    #[serde(with = "opt_millis")]
    pub body: Option<Duration>,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connection_request: Duration::from_millis(10_000),
            socket: Duration::from_millis(1_000),
            connect: Duration::from_millis(5_000),
            body: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Scheme and host, e.g. `http://10.0.0.5`.
    pub host: String,
    pub port: u16,
    pub phone: String,
    pub password: String,
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
    /// Charset for form bodies, and for responses that do not declare one.
    #[serde(default = "default_charset")]
    pub charset: String,
    #[serde(default)]
    pub timeouts: Timeouts,
    /// Percent-encode query values. Off by default: the server has always
    /// received them raw.
    #[serde(default)]
    pub escape_query_values: bool,
}

impl Config {
    pub fn new(host: &str, port: u16, phone: &str, password: &str) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            port,
            phone: phone.to_string(),
            password: password.to_string(),
            url_prefix: default_url_prefix(),
            charset: default_charset(),
            timeouts: Timeouts::default(),
            escape_query_values: false,
        }
    }

    pub fn with_url_prefix(mut self, prefix: &str) -> Self {
        self.set_url_prefix(prefix);
        self
    }

    pub fn with_charset(mut self, charset: &str) -> Self {
        self.set_charset(charset);
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_escaped_query_values(mut self, escape: bool) -> Self {
        self.escape_query_values = escape;
        self
    }

    pub fn set_url_prefix(&mut self, prefix: &str) {
        self.url_prefix = prefix.trim_end_matches('/').to_string();
    }

    pub fn set_charset(&mut self, charset: &str) {
        self.charset = charset.to_string();
    }

    pub fn set_timeouts(&mut self, timeouts: Timeouts) {
        self.timeouts = timeouts;
    }

    /// `host:port` followed by the prefix and `path`.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}:{}{}{}", self.host, self.port, self.url_prefix, path)
    }
}

fn default_url_prefix() -> String {
    DEFAULT_URL_PREFIX.to_string()
}

fn default_charset() -> String {
    DEFAULT_CHARSET.to_string()
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

mod opt_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => super::millis::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(deserializer).map(|ms| ms.map(Duration::from_millis))
    }
}
