//! Dual-target ingest with existence-based deduplication

use std::sync::Arc;

use telestash_core::JSON_CONTENT_TYPE;
use telestash_storage::{BlobStore, StorageError};
use tracing::{debug, info, warn};

use super::TelemetryPayload;
use crate::error::IngestError;

/// Result of a successful ingest call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Written to both targets
    Stored {
        blob_name: String,
        primary_container: String,
        secondary_container: String,
    },
    /// A blob with the same name was already present; nothing was written
    AlreadyExists { blob_name: String, container: String },
}

impl IngestOutcome {
    /// Human-readable response body
    pub fn message(&self) -> String {
        match self {
            IngestOutcome::Stored {
                blob_name,
                primary_container,
                secondary_container,
            } => format!(
                "Payload stored in containers {} and {} as {}",
                primary_container, secondary_container, blob_name
            ),
            IngestOutcome::AlreadyExists {
                blob_name,
                container,
            } => format!("Blob {} already exists in {}", blob_name, container),
        }
    }
}

/// Mirrors payloads into a primary and a secondary storage target.
///
/// The two writes are not atomic: if the secondary upload fails after the
/// primary succeeded, the targets diverge and the error is returned as-is.
pub struct IngestService {
    primary: Arc<dyn BlobStore>,
    secondary: Arc<dyn BlobStore>,
}

impl IngestService {
    pub fn new(primary: Arc<dyn BlobStore>, secondary: Arc<dyn BlobStore>) -> Self {
        Self { primary, secondary }
    }

    pub async fn ingest(&self, payload: &TelemetryPayload) -> Result<IngestOutcome, IngestError> {
        let blob_name = payload.blob_name();

        // Primary is consulted first and wins the "already exists" report
        for store in [&self.primary, &self.secondary] {
            if store.exists(&blob_name).await? {
                info!(
                    "Blob {} already exists in {}, skipping upload",
                    blob_name,
                    store.container()
                );
                return Ok(IngestOutcome::AlreadyExists {
                    blob_name,
                    container: store.container().to_string(),
                });
            }
        }

        let body = payload.to_bytes()?;
        debug!("Uploading {} ({} bytes) to both targets", blob_name, body.len());

        for store in [&self.primary, &self.secondary] {
            match store.put(&blob_name, body.clone(), JSON_CONTENT_TYPE).await {
                Ok(()) => {}
                // Lost a race with a concurrent ingest of the same reading
                Err(StorageError::AlreadyExists(_)) => {
                    warn!(
                        "Blob {} appeared in {} during upload",
                        blob_name,
                        store.container()
                    );
                    return Ok(IngestOutcome::AlreadyExists {
                        container: store.container().to_string(),
                        blob_name,
                    });
                }
                Err(e) => {
                    warn!(
                        "Upload of {} to {} failed: {}",
                        blob_name,
                        store.container(),
                        e
                    );
                    return Err(e.into());
                }
            }
        }

        info!(
            "Stored {} in {} and {}",
            blob_name,
            self.primary.container(),
            self.secondary.container()
        );

        Ok(IngestOutcome::Stored {
            blob_name,
            primary_container: self.primary.container().to_string(),
            secondary_container: self.secondary.container().to_string(),
        })
    }
}
