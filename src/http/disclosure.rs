//! Token disclosure endpoint (`trust_mode = "disclose"`).
//!
//! Hands the upstream credential and base URL to a gated caller so it can
//! call upstream directly. Once served, the token must be treated as known
//! to that client; this mode never runs alongside the forwarding routes.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct TokenDisclosure {
    pub token: String,
    #[serde(rename = "baseURL")]
    pub base_url: String,
}

pub async fn disclose_token(State(state): State<AppState>) -> Json<TokenDisclosure> {
    let upstream = state.forwarder.upstream();
    tracing::info!("Disclosing upstream credential to gated caller");
    Json(TokenDisclosure {
        token: upstream.credential.expose().to_string(),
        base_url: upstream.base_url.clone(),
    })
}
