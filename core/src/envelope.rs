//! The uniform JSON envelope returned by every vendor endpoint.
//!
//! # Design
//! The vendor does not publish a fixed schema for `data`, so `Envelope`
//! keeps the whole response as an ordered `serde_json` map. Typed accessors
//! sit on top for the fields every response carries (`code`, `msg`, `data`)
//! and for the handful the client itself relies on (`data.jwtToken`).
//! Callers that know a payload's shape can use `data_as` to deserialize it.

use std::fmt;
use std::ops::Deref;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TransportError;

/// The `code` value that marks a successful response.
pub const SUCCESS_CODE: &str = "200";

/// A parsed response envelope: `{"code": "...", "msg": "...", "data": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Envelope(Map<String, Value>);

impl Envelope {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Parse a response body. The body must be a JSON object.
    pub fn from_json(body: &str) -> Result<Self, TransportError> {
        match serde_json::from_str::<Value>(body)? {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(TransportError::NotAnObject),
        }
    }

    /// The `code` field as text. Numeric codes are rendered in decimal so
    /// `200` and `"200"` compare equal.
    pub fn code(&self) -> Option<String> {
        match self.0.get("code")? {
            Value::String(code) => Some(code.clone()),
            Value::Number(code) => Some(code.to_string()),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code().as_deref() == Some(SUCCESS_CODE)
    }

    pub fn msg(&self) -> Option<&str> {
        self.0.get("msg").and_then(Value::as_str)
    }

    /// The `data` payload, if present and not `null`.
    pub fn data(&self) -> Option<&Value> {
        self.0.get("data").filter(|data| !data.is_null())
    }

    pub fn data_object(&self) -> Option<&Map<String, Value>> {
        self.data().and_then(Value::as_object)
    }

    /// A string field inside `data`.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data_object()?.get(key).and_then(Value::as_str)
    }

    /// The JWT issued by the login endpoint.
    pub fn jwt_token(&self) -> Option<&str> {
        self.data_str("jwtToken")
    }

    /// Deserialize `data` into a caller-defined type.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(self.data().unwrap_or(&Value::Null))
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl Deref for Envelope {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Compact JSON, for log output.
impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl From<Map<String, Value>> for Envelope {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
