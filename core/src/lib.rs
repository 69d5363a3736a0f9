//! Blocking client SDK for a video-surveillance AI analytics HTTP API.
//!
//! # Overview
//! Covers the vendor's login, alert subscription, alert history, device
//! query and live stream lookup endpoints. Every call is one synchronous
//! round trip returning the vendor's JSON envelope.
//!
//! # Design
//! - `VideoAiClient` holds the `Config`, a `Transport`, and the cached
//!   token; the token is the only state shared between calls.
//! - Each operation is split into `build_*` (produces an `HttpRequest`) and
//!   `parse_envelope` (consumes an `HttpResponse`), so the IO boundary stays
//!   explicit and replaceable.
//! - Responses stay untyped (`Envelope`) because the vendor schema is not
//!   fixed; typed accessors are layered on top.
//! - Logging goes through an injected `Logger`, silent by default.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod listener;
pub mod logger;
pub mod params;
pub mod transport;
pub mod types;

pub use client::{ClientBuilder, VideoAiClient};
pub use config::{Config, Timeouts};
pub use envelope::Envelope;
pub use error::{AuthFailure, ClientError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use listener::AuthListener;
pub use logger::{LogLevel, Logger, NoopLogger, TracingLogger};
pub use params::Params;
pub use transport::UreqTransport;
pub use types::{AlertQuery, DeviceQuery, SubscriptionType};
