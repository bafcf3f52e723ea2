//! Header manipulation for both directions of a forwarded call.
//!
//! # Responsibilities
//! - Build the fixed upstream header set (content type, accept, bearer,
//!   identity encoding, user agent)
//! - Strip `content-encoding` and hop-by-hop headers from relayed responses
//!
//! # Design Decisions
//! - Client headers are never copied upstream; only the request ID is
//! - The client's own `Authorization` can never replace the credential
//! - Denylist matching is case-insensitive

use axum::http::{header, HeaderMap, HeaderValue};

use crate::config::Credential;
use crate::http::error::ForwardError;
use crate::http::request::X_REQUEST_ID;

/// Response headers never relayed to the client.
///
/// Upstream calls ask for identity encoding, so `content-encoding` never
/// describes the relayed bytes. Framing headers are recomputed for the
/// relayed body.
pub const RELAY_HEADER_DENYLIST: &[&str] = &[
    "content-encoding",
    "content-length",
    "transfer-encoding",
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "upgrade",
];

const USER_AGENT: &str = concat!("api-forwarder/", env!("CARGO_PKG_VERSION"));

pub fn is_denied(name: &str) -> bool {
    RELAY_HEADER_DENYLIST
        .iter()
        .any(|denied| denied.eq_ignore_ascii_case(name))
}

/// Copy upstream response headers, minus the denylist.
pub fn relay_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut relayed = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream.iter() {
        if !is_denied(name.as_str()) {
            relayed.append(name.clone(), value.clone());
        }
    }
    relayed
}

/// The headers sent on every upstream call.
pub fn upstream_headers(credential: &Credential, inbound: &HeaderMap) -> Result<HeaderMap, ForwardError> {
    let mut headers = HeaderMap::with_capacity(6);
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("identity"));
    headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
    headers.insert(
        header::AUTHORIZATION,
        credential
            .bearer_header()
            .map_err(|_| ForwardError::BuildRequest("credential is not a valid header value".to_string()))?,
    );
    if let Some(id) = inbound.get(&X_REQUEST_ID) {
        headers.insert(X_REQUEST_ID, id.clone());
    }
    Ok(headers)
}
