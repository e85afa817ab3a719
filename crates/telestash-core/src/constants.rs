/// Header carrying the shared-secret token on every request
pub const AUTH_HEADER: &str = "X-Auth-Token";

/// Media type used for stored telemetry blobs
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Suffix appended to every telemetry blob name
pub const BLOB_EXTENSION: &str = ".json";
