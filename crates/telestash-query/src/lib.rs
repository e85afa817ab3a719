//! telestash-query: time-windowed retrieval of stored telemetry
//!
//! Lists the blobs of a storage target, keeps those modified inside the
//! requested window (optionally for one device), and returns their decoded
//! JSON contents. Fetches run concurrently in fixed-size batches.

pub mod error;
pub mod handlers;
pub mod services;

pub use error::QueryError;
pub use handlers::{configure_routes, QueryApiDoc, QueryAppState};
pub use services::{BlobCache, QueryFilter, QueryService, DEFAULT_BATCH_SIZE};
