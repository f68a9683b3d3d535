//! Shared error type across metrix crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed record.
    BadRequest,
    /// Metric name not present in the store.
    NotFound,
    /// Unsupported config or snapshot version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and test vectors.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetrixError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum MetrixError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unsupported version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl MetrixError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            MetrixError::BadRequest(_) => ClientCode::BadRequest,
            MetrixError::NotFound(_) => ClientCode::NotFound,
            MetrixError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            MetrixError::Internal(_) | MetrixError::Io(_) => ClientCode::Internal,
        }
    }

    /// True for errors caused by the caller's input rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.client_code(),
            ClientCode::BadRequest | ClientCode::NotFound | ClientCode::UnsupportedVersion
        )
    }
}
