//! In-process storage target

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::{BlobInfo, BlobStore};
use crate::error::StorageError;

#[derive(Debug, Clone)]
struct StoredBlob {
    body: Bytes,
    content_type: String,
    last_modified: DateTime<Utc>,
}

/// Blob store kept in memory, ordered by name like an object-store listing
#[derive(Debug)]
pub struct MemoryBlobStore {
    container: String,
    blobs: RwLock<BTreeMap<String, StoredBlob>>,
}

impl MemoryBlobStore {
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            blobs: RwLock::new(BTreeMap::new()),
        }
    }

    /// Insert or replace a blob with an explicit modification time
    pub async fn insert_at(
        &self,
        name: &str,
        body: impl Into<Bytes>,
        content_type: &str,
        last_modified: DateTime<Utc>,
    ) {
        self.blobs.write().await.insert(
            name.to_string(),
            StoredBlob {
                body: body.into(),
                content_type: content_type.to_string(),
                last_modified,
            },
        );
    }

    /// Content type recorded for a blob
    pub async fn content_type(&self, name: &str) -> Option<String> {
        self.blobs
            .read()
            .await
            .get(name)
            .map(|blob| blob.content_type.clone())
    }

    /// Number of stored blobs
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn container(&self) -> &str {
        &self.container
    }

    async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        Ok(self.blobs.read().await.contains_key(name))
    }

    async fn put(&self, name: &str, body: Bytes, content_type: &str) -> Result<(), StorageError> {
        let mut blobs = self.blobs.write().await;
        if blobs.contains_key(name) {
            return Err(StorageError::AlreadyExists(name.to_string()));
        }

        debug!("PUT {}/{} ({} bytes)", self.container, name, body.len());
        blobs.insert(
            name.to_string(),
            StoredBlob {
                body,
                content_type: content_type.to_string(),
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Bytes, StorageError> {
        self.blobs
            .read()
            .await
            .get(name)
            .map(|blob| blob.body.clone())
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    async fn list(&self, prefix: Option<&str>) -> Result<Vec<BlobInfo>, StorageError> {
        let prefix = prefix.unwrap_or("");
        Ok(self
            .blobs
            .read()
            .await
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(name, blob)| BlobInfo {
                name: name.clone(),
                last_modified: blob.last_modified,
            })
            .collect())
    }
}
