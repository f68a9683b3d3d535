//! Axum router wiring.

use axum::{
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, handlers, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::plain::dump))
        .route("/update/", post(handlers::json::update))
        .route("/update/:mtype/:name/:value", post(handlers::plain::update))
        .route("/value/", post(handlers::json::value).get(handlers::json::list))
        .route("/value/:mtype/:name", get(handlers::plain::value))
        .route("/ping", get(ops::ping))
        .route("/healthz", get(ops::healthz))
        .with_state(state)
}
