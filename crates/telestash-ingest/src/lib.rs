//! telestash-ingest: telemetry ingest endpoint
//!
//! Accepts device payloads over HTTP and mirrors each one into a primary
//! and a secondary storage target under a deterministic blob name.

pub mod error;
pub mod handlers;
pub mod services;

pub use error::IngestError;
pub use handlers::{configure_routes, IngestApiDoc, IngestAppState};
pub use services::{IngestOutcome, IngestService, TelemetryPayload};
