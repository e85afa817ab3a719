//! Storage target implementations

mod blob_store;
mod memory_store;
mod s3_store;

pub use blob_store::{connect, BlobInfo, BlobStore};
pub use memory_store::MemoryBlobStore;
pub use s3_store::S3BlobStore;
