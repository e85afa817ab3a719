//! Connection strings for storage targets
//!
//! Two forms are accepted:
//! - `memory://` for an in-process store
//! - `Endpoint=http://localhost:9000;Region=us-east-1;AccessKeyId=...;SecretAccessKey=...`
//!   for S3-compatible storage. `Endpoint` and `Region` are optional; keys are
//!   case-insensitive.

use std::fmt;
use std::str::FromStr;

use crate::error::StorageError;

/// Scheme selecting the in-process store
pub const MEMORY_SCHEME: &str = "memory://";

/// Region used when the connection string does not name one
pub const DEFAULT_REGION: &str = "us-east-1";

/// Parsed connection string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionString {
    Memory,
    S3(S3Connection),
}

/// Credentials and location of an S3-compatible endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct S3Connection {
    /// Custom endpoint for MinIO/RustFS; `None` means AWS
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for S3Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Connection")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"****")
            .finish()
    }
}

impl FromStr for ConnectionString {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(MEMORY_SCHEME) {
            return Ok(ConnectionString::Memory);
        }

        let mut endpoint = None;
        let mut region = None;
        let mut access_key_id = None;
        let mut secret_access_key = None;

        for segment in s.split(';').map(str::trim).filter(|seg| !seg.is_empty()) {
            // Values may themselves contain '=' (base64 secrets), so split once
            let (key, value) = segment.split_once('=').ok_or_else(|| {
                StorageError::InvalidConnectionString(format!(
                    "segment '{}' is not a Key=Value pair",
                    segment
                ))
            })?;
            let value = value.trim().to_string();

            match key.trim().to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(value),
                "region" => region = Some(value),
                "accesskeyid" => access_key_id = Some(value),
                "secretaccesskey" => secret_access_key = Some(value),
                other => {
                    return Err(StorageError::InvalidConnectionString(format!(
                        "unknown key '{}'",
                        other
                    )))
                }
            }
        }

        let access_key_id = access_key_id.ok_or_else(|| {
            StorageError::InvalidConnectionString("missing AccessKeyId".to_string())
        })?;
        let secret_access_key = secret_access_key.ok_or_else(|| {
            StorageError::InvalidConnectionString("missing SecretAccessKey".to_string())
        })?;

        Ok(ConnectionString::S3(S3Connection {
            endpoint: endpoint.filter(|e| !e.is_empty()),
            region: region
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            access_key_id,
            secret_access_key,
        }))
    }
}
