use axum::{extract::State, Json};
use bytes::Bytes;

use metrix_core::protocol::{decode_metric, decode_query, Metrics};

use crate::app_state::AppState;

use super::ApiError;

// Bodies are taken as raw bytes so shape errors come from our decoder (400)
// instead of axum's JSON rejection (415/422).

/// `POST /update/`
pub async fn update(State(app): State<AppState>, body: Bytes) -> Result<Json<Metrics>, ApiError> {
    let metric = decode_metric(&body)?;
    let stored = app.apply(metric).await;
    Ok(Json(stored.into()))
}

/// `POST /value/`
pub async fn value(State(app): State<AppState>, body: Bytes) -> Result<Json<Metrics>, ApiError> {
    let query = decode_query(&body)?;
    let metric = app.lookup(query.kind()?, &query.id)?;
    Ok(Json(metric.into()))
}

/// `GET /value/`
pub async fn list(State(app): State<AppState>) -> Json<Vec<Metrics>> {
    Json(app.all_records())
}
