use std::sync::Arc;

use axum::{routing::get, Json, Router};
use telestash_ingest::{IngestApiDoc, IngestAppState};
use telestash_query::{QueryApiDoc, QueryAppState};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use utoipa::openapi::{server::Server, OpenApi as OpenApiDocument};
use utoipa::OpenApi;

/// Prefix under which every endpoint is mounted
const API_PREFIX: &str = "/api";

/// Assemble the ingest and query routes under `/api`
pub fn build_router(ingest_state: Arc<IngestAppState>, query_state: Arc<QueryAppState>) -> Router {
    let api = telestash_ingest::configure_routes()
        .with_state(ingest_state)
        .merge(telestash_query::configure_routes().with_state(query_state))
        .route("/openapi.json", get(openapi_json));

    Router::new()
        .nest(API_PREFIX, api)
        // A panicking handler still answers with a 500
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
}

/// Combined OpenAPI document for both endpoints
pub fn openapi() -> OpenApiDocument {
    let mut doc = IngestApiDoc::openapi();
    doc.merge(QueryApiDoc::openapi());
    doc.servers = Some(vec![Server::new(API_PREFIX)]);
    doc
}

async fn openapi_json() -> Json<OpenApiDocument> {
    Json(openapi())
}
