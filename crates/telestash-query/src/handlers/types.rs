//! Request and state types for query handlers

use std::sync::Arc;

use serde::Deserialize;
use telestash_core::{parse_utc_override, SharedSecret};
use utoipa::IntoParams;

use crate::error::QueryError;
use crate::services::{QueryFilter, QueryService};

/// Application state for query handlers
pub struct QueryAppState {
    pub query_service: Arc<QueryService>,
    /// Expected value of the `X-Auth-Token` header
    pub secret: SharedSecret,
}

/// Query-string parameters of the query endpoint
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QueryParams {
    /// Window start, ISO-8601; any offset is ignored and the time read as UTC
    #[param(example = "2024-01-01T00:00:00")]
    pub start_time: Option<String>,
    /// Window end (inclusive), ISO-8601; read as UTC like `start_time`
    #[param(example = "2024-01-02T00:00:00")]
    pub end_time: Option<String>,
    /// Restrict results to blobs whose name starts with this device id
    #[param(example = "dev1")]
    pub device_uid: Option<String>,
}

impl QueryParams {
    /// Validate the parameters into a filter
    pub fn into_filter(self) -> Result<QueryFilter, QueryError> {
        let (Some(start_time), Some(end_time)) = (
            self.start_time.filter(|s| !s.is_empty()),
            self.end_time.filter(|s| !s.is_empty()),
        ) else {
            return Err(QueryError::MissingTimeRange);
        };

        let start = parse_utc_override(&start_time).map_err(|_| QueryError::InvalidTime {
            param: "start_time",
            value: start_time,
        })?;
        let end = parse_utc_override(&end_time).map_err(|_| QueryError::InvalidTime {
            param: "end_time",
            value: end_time,
        })?;

        Ok(QueryFilter::new(start, end, self.device_uid))
    }
}
