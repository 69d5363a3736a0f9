//! Request inputs for the vendor endpoints.
//!
//! # Design
//! The vendor takes every parameter as a string; these types give the
//! optional ones `Option` and the subscribe flag an enum, then flatten into
//! `Params` in the wire names the server expects.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::params::Params;

/// The `type` flag of the subscription endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionType {
    #[serde(rename = "1")]
    Subscribe,
    #[serde(rename = "2")]
    Unsubscribe,
}

impl SubscriptionType {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionType::Subscribe => "1",
            SubscriptionType::Unsubscribe => "2",
        }
    }
}

impl fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paged alert history query.
///
/// Dates are `yyMMdd`. `end_date_time` is only honoured by the server
/// together with `start_date_time`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlertQuery {
    pub alert_type: String,
    pub device_id: String,
    pub start_date_time: Option<String>,
    pub end_date_time: Option<String>,
    pub start_page: u32,
    pub page_size: u32,
}

impl AlertQuery {
    pub fn new(alert_type: &str, device_id: &str, start_page: u32, page_size: u32) -> Self {
        Self {
            alert_type: alert_type.to_string(),
            device_id: device_id.to_string(),
            start_date_time: None,
            end_date_time: None,
            start_page,
            page_size,
        }
    }

    pub fn between(mut self, start: &str, end: Option<&str>) -> Self {
        self.start_date_time = Some(start.to_string());
        self.end_date_time = end.map(str::to_string);
        self
    }

    pub fn to_params(&self) -> Params {
        Params::new()
            .with("type", self.alert_type.as_str())
            .with("deviceId", self.device_id.as_str())
            .with_opt("startDateTime", self.start_date_time.as_deref())
            .with_opt("endDateTime", self.end_date_time.as_deref())
            .with("startPage", self.start_page.to_string())
            .with("pageSize", self.page_size.to_string())
    }
}

/// Paged device query. `name` is matched as a substring by the server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceQuery {
    pub name: Option<String>,
    pub device_id: Option<String>,
    pub start_page: u32,
    pub page_size: u32,
}

impl DeviceQuery {
    pub fn new(start_page: u32, page_size: u32) -> Self {
        Self {
            start_page,
            page_size,
            ..Self::default()
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn device_id(mut self, device_id: &str) -> Self {
        self.device_id = Some(device_id.to_string());
        self
    }

    pub fn to_params(&self) -> Params {
        Params::new()
            .with_opt("name", self.name.as_deref())
            .with_opt("deviceId", self.device_id.as_deref())
            .with("startPage", self.start_page.to_string())
            .with("pageSize", self.page_size.to_string())
    }
}
