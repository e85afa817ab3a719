//! HTTP handlers for the ingest endpoint

pub mod handler;
pub mod types;

pub use handler::{configure_routes, IngestApiDoc};
pub use types::*;
