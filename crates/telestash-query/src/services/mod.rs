//! Query service implementation

mod blob_cache;
mod query_service;

pub use blob_cache::BlobCache;
pub use query_service::{QueryFilter, QueryService, DEFAULT_BATCH_SIZE};
