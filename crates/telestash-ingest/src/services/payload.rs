//! Telemetry payload validation and blob naming

use bytes::Bytes;
use serde_json::{Map, Value};
use telestash_core::BLOB_EXTENSION;

use crate::error::IngestError;

/// Field holding the device identifier
pub const DEVICE_UID_FIELD: &str = "DeviceUID";
/// Field holding the reading timestamp
pub const DATE_TIME_FIELD: &str = "DateTime";

/// A device payload that carries the fields needed to name its blob.
///
/// Everything else in the document is opaque and stored verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryPayload {
    document: Map<String, Value>,
    device_uid: String,
    date_time: String,
}

impl TelemetryPayload {
    /// Parse a raw request body
    pub fn from_slice(body: &[u8]) -> Result<Self, IngestError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(IngestError::EmptyPayload);
        }

        let value: Value =
            serde_json::from_slice(body).map_err(|e| IngestError::InvalidJson(e.to_string()))?;

        Self::from_value(value)
    }

    /// Validate an already decoded JSON value
    pub fn from_value(value: Value) -> Result<Self, IngestError> {
        if is_empty_value(&value) {
            return Err(IngestError::EmptyPayload);
        }

        let Value::Object(document) = value else {
            return Err(IngestError::MissingField(DEVICE_UID_FIELD));
        };

        let device_uid = required_string(&document, DEVICE_UID_FIELD)?;
        let date_time = required_string(&document, DATE_TIME_FIELD)?;

        Ok(Self {
            document,
            device_uid,
            date_time,
        })
    }

    /// Deterministic blob name, also the dedup key: `{DeviceUID}_{DateTime}.json`
    pub fn blob_name(&self) -> String {
        format!("{}_{}{}", self.device_uid, self.date_time, BLOB_EXTENSION)
    }

    /// Serialized document as stored in every target
    pub fn to_bytes(&self) -> Result<Bytes, IngestError> {
        serde_json::to_vec(&self.document)
            .map(Bytes::from)
            .map_err(|e| IngestError::Internal(format!("Failed to serialize payload: {}", e)))
    }
}

fn required_string(document: &Map<String, Value>, field: &'static str) -> Result<String, IngestError> {
    match document.get(field) {
        Some(Value::String(value)) => Ok(value.clone()),
        _ => Err(IngestError::MissingField(field)),
    }
}

/// JSON values that carry no content count as an empty payload
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}
