//! Time-windowed blob retrieval

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use telestash_storage::{BlobInfo, BlobStore};
use tracing::debug;

use super::BlobCache;
use crate::error::QueryError;

/// Number of blobs fetched concurrently before moving to the next batch
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Which blobs a query selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilter {
    /// Inclusive lower bound on last-modified time
    pub start: DateTime<Utc>,
    /// Inclusive upper bound on last-modified time
    pub end: DateTime<Utc>,
    /// Device identifier; used as a listing prefix and a name filter
    pub device_uid: Option<String>,
}

impl QueryFilter {
    /// An empty device identifier means "all devices"
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, device_uid: Option<String>) -> Self {
        Self {
            start,
            end,
            device_uid: device_uid.filter(|uid| !uid.is_empty()),
        }
    }

    pub fn matches(&self, blob: &BlobInfo) -> bool {
        let in_window = self.start <= blob.last_modified && blob.last_modified <= self.end;
        let for_device = self
            .device_uid
            .as_deref()
            .map_or(true, |uid| blob.name.contains(uid));

        in_window && for_device
    }
}

/// Lists, filters and fetches blobs from one storage target
pub struct QueryService {
    store: Arc<dyn BlobStore>,
    batch_size: usize,
}

impl QueryService {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            store,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Decoded contents of every matching blob, in listing order.
    ///
    /// Per-blob failures appear inline as `{"error": "..."}`; only a listing
    /// failure fails the whole query.
    pub async fn query(&self, filter: &QueryFilter) -> Result<Vec<Value>, QueryError> {
        let listed = self.store.list(filter.device_uid.as_deref()).await?;
        let selected: Vec<&str> = listed
            .iter()
            .filter(|blob| filter.matches(blob))
            .map(|blob| blob.name.as_str())
            .collect();

        debug!(
            "Query on {} selected {} of {} blobs",
            self.store.container(),
            selected.len(),
            listed.len()
        );

        let mut cache = BlobCache::new(Arc::clone(&self.store));
        let mut documents = Vec::with_capacity(selected.len());
        for batch in selected.chunks(self.batch_size) {
            documents.extend(cache.resolve_batch(batch).await);
        }

        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use telestash_core::JSON_CONTENT_TYPE;
    use telestash_storage::{MemoryBlobStore, StorageError};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
    }

    /// Wraps a memory store and records fetch concurrency
    struct InstrumentedStore {
        inner: MemoryBlobStore,
        gets: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl InstrumentedStore {
        fn new() -> Self {
            Self {
                inner: MemoryBlobStore::new("primary"),
                gets: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl BlobStore for InstrumentedStore {
        fn container(&self) -> &str {
            self.inner.container()
        }

        async fn exists(&self, name: &str) -> Result<bool, StorageError> {
            self.inner.exists(name).await
        }

        async fn put(&self, name: &str, body: Bytes, ct: &str) -> Result<(), StorageError> {
            self.inner.put(name, body, ct).await
        }

        async fn get(&self, name: &str) -> Result<Bytes, StorageError> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.inner.get(name).await
        }

        async fn list(&self, prefix: Option<&str>) -> Result<Vec<BlobInfo>, StorageError> {
            self.inner.list(prefix).await
        }
    }

    #[test]
    fn test_filter_window_is_inclusive() {
        let filter = QueryFilter::new(at(1), at(3), None);
        let blob = |hour| BlobInfo {
            name: "dev1_x.json".to_string(),
            last_modified: at(hour),
        };

        assert!(!filter.matches(&blob(0)));
        assert!(filter.matches(&blob(1)));
        assert!(filter.matches(&blob(2)));
        assert!(filter.matches(&blob(3)));
        assert!(!filter.matches(&blob(4)));
    }

    #[test]
    fn test_filter_empty_device_means_all() {
        let filter = QueryFilter::new(at(0), at(1), Some(String::new()));
        assert_eq!(filter.device_uid, None);
    }

    #[test]
    fn test_filter_device_substring() {
        let filter = QueryFilter::new(at(0), at(5), Some("dev1".to_string()));
        let named = |name: &str| BlobInfo {
            name: name.to_string(),
            last_modified: at(1),
        };

        assert!(filter.matches(&named("dev1_2024.json")));
        assert!(!filter.matches(&named("dev2_2024.json")));
    }

    #[tokio::test]
    async fn test_query_returns_in_window_blobs_in_listing_order() {
        let store = Arc::new(MemoryBlobStore::new("primary"));
        store.insert_at("dev1_a.json", r#"{"id":"a"}"#, JSON_CONTENT_TYPE, at(1)).await;
        store.insert_at("dev1_b.json", r#"{"id":"b"}"#, JSON_CONTENT_TYPE, at(5)).await;
        store.insert_at("dev2_c.json", r#"{"id":"c"}"#, JSON_CONTENT_TYPE, at(2)).await;

        let service = QueryService::new(store);
        let documents = service
            .query(&QueryFilter::new(at(0), at(3), None))
            .await
            .unwrap();

        assert_eq!(documents, vec![json!({"id": "a"}), json!({"id": "c"})]);
    }

    #[tokio::test]
    async fn test_query_device_prefix() {
        let store = Arc::new(MemoryBlobStore::new("primary"));
        store.insert_at("dev1_a.json", r#"{"id":"a"}"#, JSON_CONTENT_TYPE, at(1)).await;
        store.insert_at("dev10_b.json", r#"{"id":"b"}"#, JSON_CONTENT_TYPE, at(1)).await;
        store.insert_at("xdev1_c.json", r#"{"id":"c"}"#, JSON_CONTENT_TYPE, at(1)).await;

        let service = QueryService::new(store);
        let documents = service
            .query(&QueryFilter::new(at(0), at(3), Some("dev1".to_string())))
            .await
            .unwrap();

        // Prefix listing: "xdev1_c" contains dev1 but does not start with it
        assert_eq!(documents, vec![json!({"id": "a"}), json!({"id": "b"})]);
    }

    #[tokio::test]
    async fn test_query_fetches_in_bounded_batches() {
        let store = Arc::new(InstrumentedStore::new());
        for i in 0..7 {
            store
                .inner
                .insert_at(
                    &format!("dev1_{}.json", i),
                    format!(r#"{{"i":{}}}"#, i),
                    JSON_CONTENT_TYPE,
                    at(1),
                )
                .await;
        }

        let service = QueryService::new(store.clone()).with_batch_size(3);
        let documents = service
            .query(&QueryFilter::new(at(0), at(2), None))
            .await
            .unwrap();

        assert_eq!(documents.len(), 7);
        assert_eq!(documents[6], json!({"i": 6}));
        assert_eq!(store.gets.load(Ordering::SeqCst), 7);
        assert_eq!(store.max_in_flight.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_empty_window_fetches_nothing() {
        let store = Arc::new(InstrumentedStore::new());
        store.inner.insert_at("dev1_a.json", "{}", JSON_CONTENT_TYPE, at(10)).await;

        let service = QueryService::new(store.clone());
        let documents = service
            .query(&QueryFilter::new(at(0), at(1), None))
            .await
            .unwrap();

        assert!(documents.is_empty());
        assert_eq!(store.gets.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_batch_size_is_at_least_one() {
        let service = QueryService::new(Arc::new(MemoryBlobStore::new("primary"))).with_batch_size(0);
        assert_eq!(service.batch_size(), 1);
    }
}
