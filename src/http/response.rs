//! Response handling and transformation.
//!
//! # Responsibilities
//! - Classify the upstream body as JSON or raw bytes
//! - Carry status and filtered headers back to the client
//!
//! # Design Decisions
//! - The upstream body is buffered fully before relaying
//! - Non-JSON bodies (empty, plain-text errors) pass through unmodified
//! - Upstream non-2xx is a normal response, relayed verbatim

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

/// Upstream body, decided once per response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Raw(Bytes),
}

impl ResponseBody {
    pub fn classify(bytes: Bytes) -> Self {
        match serde_json::from_slice(&bytes) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Raw(bytes),
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, ResponseBody::Json(_))
    }

    fn into_bytes(self) -> Bytes {
        match self {
            // Serializing a Value cannot fail: keys are always strings.
            ResponseBody::Json(value) => Bytes::from(serde_json::to_vec(&value).unwrap_or_default()),
            ResponseBody::Raw(bytes) => bytes,
        }
    }
}

/// What the client receives for one relayed call.
#[derive(Debug)]
pub struct OutboundResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ResponseBody,
}

impl IntoResponse for OutboundResponse {
    fn into_response(self) -> Response {
        let OutboundResponse { status, mut headers, body } = self;
        if body.is_json() && !headers.contains_key(header::CONTENT_TYPE) {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let mut response = Response::new(Body::from(body.into_bytes()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_json_and_raw() {
        assert!(ResponseBody::classify(Bytes::from_static(br#"{"data":[]}"#)).is_json());
        assert!(ResponseBody::classify(Bytes::from_static(b"null")).is_json());
        assert_eq!(
            ResponseBody::classify(Bytes::from_static(b"Bad Gateway")),
            ResponseBody::Raw(Bytes::from_static(b"Bad Gateway"))
        );
        assert_eq!(ResponseBody::classify(Bytes::new()), ResponseBody::Raw(Bytes::new()));
    }

    #[tokio::test]
    async fn test_json_without_content_type_is_labelled() {
        let response = OutboundResponse {
            status: StatusCode::CREATED,
            headers: HeaderMap::new(),
            body: ResponseBody::Json(serde_json::json!({"id": "o1"})),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "application/json");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], br#"{"id":"o1"}"#);
    }

    #[tokio::test]
    async fn test_raw_body_is_untouched() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let response = OutboundResponse {
            status: StatusCode::BAD_GATEWAY,
            headers,
            body: ResponseBody::Raw(Bytes::from_static(b"  upstream down \n")),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "text/plain");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"  upstream down \n");
    }
}
