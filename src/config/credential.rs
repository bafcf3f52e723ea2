//! Upstream bearer credential.

use std::fmt;

use axum::http::HeaderValue;
use serde::Deserialize;

/// Opaque bearer token authorizing calls to the upstream API.
///
/// The token never appears in `Debug` or `Display` output, so it can sit
/// inside config structs that are logged or printed on startup errors.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The raw token. Only the disclosure endpoint and header construction
    /// should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Build the `Authorization: Bearer ...` value, flagged sensitive so
    /// hyper and tracing skip it.
    pub fn bearer_header(&self) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}
