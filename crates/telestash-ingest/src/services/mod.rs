//! Ingest service implementation

mod ingest_service;
mod payload;

pub use ingest_service::{IngestOutcome, IngestService};
pub use payload::{TelemetryPayload, DATE_TIME_FIELD, DEVICE_UID_FIELD};
