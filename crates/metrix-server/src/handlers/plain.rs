use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use metrix_core::protocol::text::{parse_counter, parse_gauge};
use metrix_core::protocol::Metric;
use metrix_core::MetricKind;

use crate::app_state::AppState;

use super::ApiError;

/// `POST /update/{type}/{name}/{value}`
pub async fn update(
    State(app): State<AppState>,
    Path((mtype, name, value)): Path<(String, String, String)>,
) -> Result<StatusCode, ApiError> {
    let metric = match mtype.parse::<MetricKind>()? {
        MetricKind::Gauge => Metric::Gauge {
            id: name,
            value: parse_gauge(&value)?,
        },
        MetricKind::Counter => Metric::Counter {
            id: name,
            delta: parse_counter(&value)?,
        },
    };
    app.apply(metric).await;
    Ok(StatusCode::OK)
}

/// `GET /value/{type}/{name}`
pub async fn value(
    State(app): State<AppState>,
    Path((mtype, name)): Path<(String, String)>,
) -> Result<String, ApiError> {
    let kind = mtype.parse::<MetricKind>()?;
    Ok(app.lookup(kind, &name)?.value_text())
}

/// `GET /`
pub async fn dump(State(app): State<AppState>) -> String {
    app.render_text()
}
