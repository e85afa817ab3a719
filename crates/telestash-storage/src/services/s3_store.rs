//! Storage target backed by an S3-compatible bucket

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Region, SharedCredentialsProvider};
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::{BlobInfo, BlobStore};
use crate::connection::S3Connection;
use crate::error::StorageError;

/// S3 error code returned when `If-None-Match: *` finds an existing object
const PRECONDITION_FAILED: &str = "PreconditionFailed";

/// Blob store for one bucket of an S3/MinIO endpoint
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    /// Build a client from connection credentials
    pub async fn connect(connection: &S3Connection, bucket: &str) -> Self {
        debug!(
            "Creating S3 client for bucket '{}' in region {}",
            bucket, connection.region
        );

        let credentials = Credentials::new(
            &connection.access_key_id,
            &connection.secret_access_key,
            None,
            None,
            "telestash-storage",
        );
        let region_provider =
            RegionProviderChain::first_try(Region::new(connection.region.clone()));

        let mut config_builder = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(region_provider)
            .credentials_provider(SharedCredentialsProvider::new(credentials));

        if let Some(endpoint) = connection.endpoint.as_deref() {
            config_builder = config_builder.endpoint_url(endpoint);
        }

        let config = config_builder.load().await;
        let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&config);

        // Force path-style addressing for MinIO compatibility
        if connection.endpoint.is_some() {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        Self::from_client(Client::from_conf(s3_config_builder.build()), bucket)
    }

    /// Wrap an already configured client
    pub fn from_client(client: Client, bucket: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    fn container(&self) -> &str {
        &self.bucket
    }

    async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        debug!("HEAD {}/{}", self.bucket, name);

        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(name)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(StorageError::S3(e.to_string())),
        }
    }

    async fn put(&self, name: &str, body: Bytes, content_type: &str) -> Result<(), StorageError> {
        debug!("PUT {}/{} ({} bytes)", self.bucket, name, body.len());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(name)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .if_none_match("*")
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().and_then(|se| se.code()) == Some(PRECONDITION_FAILED) {
                    StorageError::AlreadyExists(name.to_string())
                } else {
                    StorageError::UploadFailed(e.to_string())
                }
            })?;

        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Bytes, StorageError> {
        debug!("GET {}/{}", self.bucket, name);

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(name)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    StorageError::NotFound(name.to_string())
                } else {
                    StorageError::S3(e.to_string())
                }
            })?;

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        Ok(body.into_bytes())
    }

    async fn list(&self, prefix: Option<&str>) -> Result<Vec<BlobInfo>, StorageError> {
        debug!("LIST {} prefix={:?}", self.bucket, prefix);

        let mut blobs = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let response = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .set_prefix(prefix.map(str::to_string))
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .map_err(|e| StorageError::S3(e.to_string()))?;

            blobs.extend(response.contents().iter().filter_map(|obj| {
                let name = obj.key()?;
                let last_modified = obj
                    .last_modified()
                    .and_then(|dt| DateTime::<Utc>::from_timestamp(dt.secs(), dt.subsec_nanos()))
                    .unwrap_or_default();

                Some(BlobInfo {
                    name: name.to_string(),
                    last_modified,
                })
            }));

            match response.next_continuation_token() {
                Some(token) if response.is_truncated().unwrap_or(false) => {
                    continuation_token = Some(token.to_string());
                }
                _ => break,
            }
        }

        debug!("LIST {} returned {} blobs", self.bucket, blobs.len());
        Ok(blobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_client() -> Client {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();
        Client::from_conf(config)
    }

    #[test]
    fn test_container_is_bucket() {
        let store = S3BlobStore::from_client(offline_client(), "telemetry-primary");
        assert_eq!(store.container(), "telemetry-primary");
    }
}
