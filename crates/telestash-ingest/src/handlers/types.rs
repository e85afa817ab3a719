//! State types for ingest handlers

use std::sync::Arc;

use telestash_core::SharedSecret;

use crate::services::IngestService;

/// Application state for ingest handlers
pub struct IngestAppState {
    pub ingest_service: Arc<IngestService>,
    /// Expected value of the `X-Auth-Token` header
    pub secret: SharedSecret,
}
