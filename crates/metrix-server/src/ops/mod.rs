//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `/ping`    : persistence backend reachability

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::app_state::AppState;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn ping(State(state): State<AppState>) -> impl IntoResponse {
    match state.persistence().ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::warn!(error = %e, "storage ping failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "storage unavailable")
        }
    }
}
