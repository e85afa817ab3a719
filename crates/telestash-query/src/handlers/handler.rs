//! HTTP handler for telemetry queries

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::any,
    Json, Router,
};
use tracing::{debug, warn};
use utoipa::OpenApi;

use super::types::{QueryAppState, QueryParams};
use crate::error::QueryError;

/// OpenAPI documentation for the query API
#[derive(OpenApi)]
#[openapi(
    paths(query),
    tags(
        (name = "Query", description = "Time-windowed telemetry retrieval")
    )
)]
pub struct QueryApiDoc;

/// Configure query routes. Every method is served identically.
pub fn configure_routes() -> Router<Arc<QueryAppState>> {
    Router::new().route("/query", any(query))
}

/// Fetch stored payloads modified within a time window
#[utoipa::path(
    tag = "Query",
    get,
    path = "/query",
    params(
        QueryParams,
        ("X-Auth-Token" = String, Header, description = "Shared secret"),
    ),
    responses(
        (status = 200, description = "Decoded payloads in listing order; unreadable blobs appear as {\"error\": ...}", body = [Object]),
        (status = 400, description = "Missing or invalid time range", body = Object),
        (status = 401, description = "Unauthorized", body = String),
        (status = 500, description = "Storage failure", body = String)
    )
)]
async fn query(
    State(state): State<Arc<QueryAppState>>,
    headers: HeaderMap,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Result<impl IntoResponse, QueryError> {
    if let Err(e) = state.secret.verify(&headers) {
        warn!("Rejected query request: {}", e);
        return Err(e.into());
    }

    let Query(params) = params.map_err(|e| QueryError::InvalidQueryString(e.body_text()))?;
    let filter = params.into_filter()?;
    debug!(
        "Querying {} to {} for device {:?}",
        filter.start, filter.end, filter.device_uid
    );

    let documents = state.query_service.query(&filter).await?;

    Ok(Json(documents))
}
