//! `MetrixError` -> HTTP response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use metrix_core::error::{ClientCode, MetrixError};
use thiserror::Error;

/// Handler error. Wraps the shared error so it can implement `IntoResponse`.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub MetrixError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.client_code() {
            ClientCode::BadRequest | ClientCode::UnsupportedVersion => StatusCode::BAD_REQUEST,
            ClientCode::NotFound => StatusCode::NOT_FOUND,
            ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, self.0.to_string()).into_response()
    }
}
