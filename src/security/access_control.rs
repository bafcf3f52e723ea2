//! Access gate for the token disclosure endpoint.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use subtle::ConstantTimeEq;

use crate::config::Credential;
use crate::http::error::ErrorBody;

/// State for [`disclosure_gate`].
#[derive(Clone)]
pub struct GateState {
    pub access_key: Arc<Credential>,
}

/// Reject callers that do not present `Authorization: Bearer <access_key>`.
pub async fn disclosure_gate(State(state): State<GateState>, request: Request<Body>, next: Next) -> Response {
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(key) if constant_time_eq(key.as_bytes(), state.access_key.expose().as_bytes()) => {
            next.run(request).await
        }
        _ => {
            tracing::warn!("Rejected token disclosure request without a valid access key");
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody {
                    error: "Unauthorized",
                    details: "a valid access key is required".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Compare without short-circuiting on the first differing byte. Lengths
/// are not secret.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
