//! Error types for the query endpoint

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use telestash_core::AuthError;
use telestash_storage::StorageError;
use thiserror::Error;
use tracing::error;

/// Errors that abort a query request
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Unauthorized")]
    Unauthorized(#[from] AuthError),

    #[error("Both start_time and end_time are required parameters")]
    MissingTimeRange,

    #[error("Invalid {param}: {value}")]
    InvalidTime { param: &'static str, value: String },

    #[error("Invalid query string: {0}")]
    InvalidQueryString(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl QueryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            QueryError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            QueryError::MissingTimeRange
            | QueryError::InvalidTime { .. }
            | QueryError::InvalidQueryString(_) => StatusCode::BAD_REQUEST,
            QueryError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match status {
            // Validation failures carry a JSON body with an `error` key
            StatusCode::BAD_REQUEST => {
                (status, Json(json!({ "error": self.to_string() }))).into_response()
            }
            StatusCode::INTERNAL_SERVER_ERROR => {
                error!("Query failed: {}", self);
                (status, format!("An error occurred: {}", self)).into_response()
            }
            _ => (status, self.to_string()).into_response(),
        }
    }
}
