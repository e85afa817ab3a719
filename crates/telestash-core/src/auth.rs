//! Shared-secret header authentication

use std::fmt;

use axum::http::HeaderMap;
use thiserror::Error;
use tracing::debug;

use crate::AUTH_HEADER;

/// Reasons a request failed authentication.
///
/// Both variants surface to callers as a plain `401 Unauthorized`; the
/// distinction only exists for logging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing {} header", AUTH_HEADER)]
    MissingToken,

    #[error("Token in {} header does not match", AUTH_HEADER)]
    InvalidToken,
}

/// Secret compared against the `X-Auth-Token` header of incoming requests
#[derive(Clone)]
pub struct SharedSecret(String);

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Check the request headers against this secret
    pub fn verify(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let provided = headers.get(AUTH_HEADER).ok_or(AuthError::MissingToken)?;

        // Header values may carry non-ASCII bytes, so compare raw bytes
        if provided.as_bytes() != self.0.as_bytes() {
            debug!("Rejecting request with mismatched {}", AUTH_HEADER);
            return Err(AuthError::InvalidToken);
        }

        Ok(())
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(****)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_token(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTH_HEADER, HeaderValue::from_str(token).unwrap());
        headers
    }

    #[test]
    fn test_verify_matching_token() {
        let secret = SharedSecret::new("secret");
        assert_eq!(secret.verify(&headers_with_token("secret")), Ok(()));
    }

    #[test]
    fn test_verify_header_name_is_case_insensitive() {
        let secret = SharedSecret::new("secret");
        let mut headers = HeaderMap::new();
        headers.insert("x-auth-token", HeaderValue::from_static("secret"));
        assert_eq!(secret.verify(&headers), Ok(()));
    }

    #[test]
    fn test_verify_wrong_token() {
        let secret = SharedSecret::new("secret");
        assert_eq!(
            secret.verify(&headers_with_token("nope")),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn test_verify_missing_token() {
        let secret = SharedSecret::new("secret");
        assert_eq!(
            secret.verify(&HeaderMap::new()),
            Err(AuthError::MissingToken)
        );
    }

    #[test]
    fn test_verify_non_ascii_secret() {
        let secret = SharedSecret::new("sécret");
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTH_HEADER,
            HeaderValue::from_bytes("sécret".as_bytes()).unwrap(),
        );
        assert_eq!(secret.verify(&headers), Ok(()));

        headers.insert(
            AUTH_HEADER,
            HeaderValue::from_bytes("secret".as_bytes()).unwrap(),
        );
        assert_eq!(secret.verify(&headers), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let secret = SharedSecret::new("super-secret-value");
        assert!(!format!("{:?}", secret).contains("super-secret-value"));
    }
}
