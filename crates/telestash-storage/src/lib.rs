//! telestash-storage: object storage targets for telemetry blobs
//!
//! A storage target is a named container reached through a connection
//! string. Targets are S3-compatible buckets in production and in-process
//! maps for tests and local development.

pub mod connection;
pub mod error;
pub mod services;

pub use connection::{ConnectionString, S3Connection};
pub use error::StorageError;
pub use services::{connect, BlobInfo, BlobStore, MemoryBlobStore, S3BlobStore};
