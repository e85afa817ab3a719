//! The storage target abstraction shared by ingest and query

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::{MemoryBlobStore, S3BlobStore};
use crate::connection::ConnectionString;
use crate::error::StorageError;

/// Listing entry for a stored blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobInfo {
    /// Blob name (object key) within the container
    pub name: String,
    /// Last modification time reported by the backend
    pub last_modified: DateTime<Utc>,
}

/// A named container of blobs
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Container (bucket) name this store writes to
    fn container(&self) -> &str;

    /// Whether a blob with this name exists
    async fn exists(&self, name: &str) -> Result<bool, StorageError>;

    /// Create a blob. Never overwrites: an existing blob yields
    /// [`StorageError::AlreadyExists`].
    async fn put(&self, name: &str, body: Bytes, content_type: &str) -> Result<(), StorageError>;

    /// Read the full content of a blob
    async fn get(&self, name: &str) -> Result<Bytes, StorageError>;

    /// List every blob, optionally restricted to names starting with `prefix`,
    /// in the backend's listing order
    async fn list(&self, prefix: Option<&str>) -> Result<Vec<BlobInfo>, StorageError>;
}

/// Build the storage target described by `connection_string`
pub async fn connect(
    connection_string: &str,
    container: &str,
) -> Result<Arc<dyn BlobStore>, StorageError> {
    let store: Arc<dyn BlobStore> = match connection_string.parse::<ConnectionString>()? {
        ConnectionString::Memory => {
            debug!("Using in-memory storage for container {}", container);
            Arc::new(MemoryBlobStore::new(container))
        }
        ConnectionString::S3(connection) => {
            Arc::new(S3BlobStore::connect(&connection, container).await)
        }
    };

    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_memory() {
        let store = connect("memory://", "telemetry").await.unwrap();
        assert_eq!(store.container(), "telemetry");
        assert!(!store.exists("missing.json").await.unwrap());
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_connection_string() {
        let result = connect("Region=us-east-1", "telemetry").await;
        assert!(matches!(
            result,
            Err(StorageError::InvalidConnectionString(_))
        ));
    }
}
