//! HTTP handler for telemetry ingest

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::any,
    Router,
};
use bytes::Bytes;
use tracing::warn;
use utoipa::OpenApi;

use super::types::IngestAppState;
use crate::error::IngestError;
use crate::services::TelemetryPayload;

/// OpenAPI documentation for the ingest API
#[derive(OpenApi)]
#[openapi(
    paths(ingest),
    tags(
        (name = "Ingest", description = "Device telemetry ingest")
    )
)]
pub struct IngestApiDoc;

/// Configure ingest routes.
///
/// The route accepts every method so that non-POST requests get the
/// endpoint's own 400 response rather than a 405.
pub fn configure_routes() -> Router<Arc<IngestAppState>> {
    Router::new().route("/ingest", any(ingest))
}

/// Store a telemetry payload in both storage targets
#[utoipa::path(
    tag = "Ingest",
    post,
    path = "/ingest",
    request_body(content = Object, content_type = "application/json", description = "Telemetry payload with DeviceUID and DateTime fields"),
    params(
        ("X-Auth-Token" = String, Header, description = "Shared secret"),
    ),
    responses(
        (status = 200, description = "Payload stored, or a blob with the same name already exists", body = String),
        (status = 400, description = "Empty or malformed payload, or unsupported method", body = String),
        (status = 401, description = "Unauthorized", body = String),
        (status = 500, description = "Storage failure", body = String)
    )
)]
async fn ingest(
    State(state): State<Arc<IngestAppState>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, IngestError> {
    if method != Method::POST {
        return Err(IngestError::UnsupportedMethod);
    }

    if let Err(e) = state.secret.verify(&headers) {
        warn!("Rejected ingest request: {}", e);
        return Err(e.into());
    }

    let payload = TelemetryPayload::from_slice(&body)?;
    let outcome = state.ingest_service.ingest(&payload).await?;

    Ok((StatusCode::OK, outcome.message()))
}
