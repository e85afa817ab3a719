//! Request-scoped cache of decoded blob contents

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use serde_json::{json, Value};
use telestash_storage::{BlobStore, StorageError};
use thiserror::Error;
use tracing::warn;

/// Why a single blob could not be turned into a JSON document
#[derive(Error, Debug)]
enum FetchError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Blob is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Blob is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decoded blob contents for one query request.
///
/// Failed fetches are cached as `{"error": "..."}` documents so a blob is
/// never fetched twice within the request, whatever the outcome.
pub struct BlobCache {
    store: Arc<dyn BlobStore>,
    entries: HashMap<String, Value>,
}

impl BlobCache {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            store,
            entries: HashMap::new(),
        }
    }

    /// Resolve one batch of blob names, in order.
    ///
    /// Names not yet cached are fetched concurrently; every fetch runs to
    /// completion before this returns, and a failing fetch does not affect
    /// its siblings.
    pub async fn resolve_batch(&mut self, names: &[&str]) -> Vec<Value> {
        let mut scheduled = HashSet::new();
        let pending: Vec<&str> = names
            .iter()
            .copied()
            .filter(|name| !self.entries.contains_key(*name) && scheduled.insert(*name))
            .collect();

        let store = Arc::clone(&self.store);
        let fetched = join_all(
            pending
                .iter()
                .map(|name| fetch_document(store.as_ref(), name)),
        )
        .await;

        for (name, document) in pending.into_iter().zip(fetched) {
            self.entries.insert(name.to_string(), document);
        }

        names
            .iter()
            // Every name was resolved above
            .map(|name| self.entries.get(*name).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

async fn fetch_document(store: &dyn BlobStore, name: &str) -> Value {
    match load_json(store, name).await {
        Ok(document) => document,
        Err(e) => {
            warn!("Failed to load blob {}: {}", name, e);
            json!({ "error": e.to_string() })
        }
    }
}

async fn load_json(store: &dyn BlobStore, name: &str) -> Result<Value, FetchError> {
    let body = store.get(name).await?;
    let text = std::str::from_utf8(&body)?;
    Ok(serde_json::from_str(text)?)
}
