//! Error types for the video AI client.
//!
//! # Design
//! Callers need to tell three situations apart: the login response did not
//! carry a token, the server answered with a non-success `code`, or the
//! round trip itself failed. Each gets one `ClientError` variant. Transport
//! failures keep their cause as a boxed source so any `Transport`
//! implementation can report its own error type.

use std::fmt;

use thiserror::Error;

use crate::envelope::Envelope;

/// Errors returned by `VideoAiClient` operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The login response was successful but did not carry a token.
    #[error("authentication failed: {reason}")]
    Auth {
        reason: AuthFailure,
        envelope: Envelope,
    },

    /// The envelope `code` was not `"200"`. Displays as the server's `msg`.
    #[error("{message}")]
    Api { code: String, message: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ClientError {
    /// The server message for `Api` errors, the display text otherwise.
    pub fn message(&self) -> String {
        match self {
            ClientError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Which part of the login envelope was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingData,
    MissingToken,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthFailure::MissingData => write!(f, "data not found"),
            AuthFailure::MissingToken => write!(f, "token not found"),
        }
    }
}

/// Network, IO, and body-decoding failures.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("malformed response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response body is not a JSON object")]
    NotAnObject,
}

impl TransportError {
    pub fn request<E>(url: &str, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        TransportError::Request {
            url: url.to_string(),
            source: source.into(),
        }
    }
}
