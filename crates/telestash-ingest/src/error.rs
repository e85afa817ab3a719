//! Error types for the ingest endpoint

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use telestash_core::AuthError;
use telestash_storage::StorageError;
use thiserror::Error;
use tracing::error;

/// Errors that can occur while ingesting a payload
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Unsupported HTTP method")]
    UnsupportedMethod,

    #[error("Unauthorized")]
    Unauthorized(#[from] AuthError),

    #[error("Empty payload")]
    EmptyPayload,

    #[error("Invalid JSON payload: {0}")]
    InvalidJson(String),

    #[error("Payload is missing required field '{0}'")]
    MissingField(&'static str),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IngestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            IngestError::UnsupportedMethod
            | IngestError::EmptyPayload
            | IngestError::InvalidJson(_)
            | IngestError::MissingField(_) => StatusCode::BAD_REQUEST,
            IngestError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            IngestError::Storage(_) | IngestError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Ingest failed: {}", self);
            return (status, format!("An error occurred: {}", self)).into_response();
        }

        (status, self.to_string()).into_response()
    }
}
