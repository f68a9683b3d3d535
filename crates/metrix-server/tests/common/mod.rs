//! Helpers shared by the HTTP integration tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(dead_code)]

use std::path::Path;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use metrix_server::config::{self, ServerConfig};

/// Send one request through the router and return status + body text.
pub async fn send(app: &Router, method: Method, uri: &str, json: Option<&str>) -> (StatusCode, String) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match json {
        Some(s) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(s.to_owned())
        }
        None => Body::empty(),
    };

    let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub async fn post(app: &Router, uri: &str) -> (StatusCode, String) {
    send(app, Method::POST, uri, None).await
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, json: &str) -> (StatusCode, String) {
    send(app, Method::POST, uri, Some(json)).await
}

/// Config persisting to `path` with the given interval (0 = synchronous).
pub fn file_config(path: &Path, store_interval_secs: u64, restore: bool) -> ServerConfig {
    config::load_from_str(&format!(
        "version: 1\nstorage:\n  file_storage_path: \"{}\"\n  store_interval_secs: {}\n  restore: {}\n",
        path.display(),
        store_interval_secs,
        restore
    ))
    .unwrap()
}

/// Config with persistence disabled.
pub fn memory_config() -> ServerConfig {
    config::load_from_str("version: 1\nstorage:\n  file_storage_path: \"\"\n").unwrap()
}
