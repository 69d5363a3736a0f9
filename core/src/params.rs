//! Ordered request parameters and their two wire encodings.
//!
//! GET parameters go into a query string of the form `?&k=v&k=v`, with values
//! sent as-is unless escaping is requested; callers pre-encode values that
//! contain reserved characters. POST parameters are form-encoded into the
//! body. Both encodings drop parameters whose value is absent.

use std::borrow::Cow;
use std::fmt;

use encoding_rs::{Encoding, UTF_8};
use url::form_urlencoded;

/// Parameter names whose values never appear in log output.
const MASKED: &[&str] = &["password"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, Option<String>)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.entries.push((key.to_string(), Some(value.into())));
        self
    }

    pub fn with_opt(mut self, key: &str, value: Option<impl Into<String>>) -> Self {
        self.entries.push((key.to_string(), value.map(Into::into)));
        self
    }

    /// Entries with a value, in insertion order.
    pub fn present(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(key, value)| value.as_deref().map(|value| (key.as_str(), value)))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.present().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.present().next().is_none()
    }

    /// `?&k=v&k=v`, or an empty string when no entry has a value.
    pub fn query_string(&self, escape: bool) -> String {
        if self.is_empty() {
            return String::new();
        }
        let mut query = String::from("?");
        for (key, value) in self.present() {
            query.push('&');
            query.push_str(key);
            query.push('=');
            if escape {
                query.extend(form_urlencoded::byte_serialize(value.as_bytes()));
            } else {
                query.push_str(value);
            }
        }
        query
    }

    /// `application/x-www-form-urlencoded` body, with values percent-encoded
    /// from their bytes in `charset`. Unknown labels fall back to UTF-8.
    pub fn form_body(&self, charset: &str) -> String {
        let encoding = Encoding::for_label(charset.trim().as_bytes()).unwrap_or(UTF_8);
        let encode: &dyn Fn(&str) -> Cow<'_, [u8]> = &|s| encoding.encode(s).0;
        form_urlencoded::Serializer::new(String::new())
            .encoding_override(Some(encode))
            .extend_pairs(self.present())
            .finish()
    }
}

/// Renders `{k=v, ...}` with sensitive values masked, for log output.
impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match value {
                Some(_) if MASKED.contains(&key.as_str()) => write!(f, "{key}=***")?,
                Some(value) => write!(f, "{key}={value}")?,
                None => write!(f, "{key}=null")?,
            }
        }
        write!(f, "}}")
    }
}
