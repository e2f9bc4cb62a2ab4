//! Transport error type for retry classification.

use std::fmt;

/// Error returned by a single backend request (curl failure, HTTP status, credential lookup).
/// Used so we can classify and decide retries before mapping to a stage error.
#[derive(Debug)]
pub enum TransportError {
    /// Curl reported an error (timeout, connection, etc.).
    Curl(curl::Error),
    /// HTTP response had a status the caller does not accept.
    Http(u32),
    /// The credential provider could not produce a token. Not retried.
    Credential(String),
    /// Multipart form could not be assembled. Not retried.
    Form(curl::FormError),
    /// Request body could not be serialized. Not retried.
    Encode(serde_json::Error),
    /// The caller's abort flag stopped the request. Not retried.
    Aborted,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Curl(e) => write!(f, "{}", e),
            TransportError::Http(code) => write!(f, "HTTP {}", code),
            TransportError::Credential(msg) => write!(f, "credential: {}", msg),
            TransportError::Form(e) => write!(f, "multipart form: {}", e),
            TransportError::Encode(e) => write!(f, "encode request: {}", e),
            TransportError::Aborted => write!(f, "aborted"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Curl(e) => Some(e),
            TransportError::Form(e) => Some(e),
            TransportError::Encode(e) => Some(e),
            TransportError::Http(_) | TransportError::Credential(_) | TransportError::Aborted => None,
        }
    }
}

impl From<curl::Error> for TransportError {
    fn from(e: curl::Error) -> Self {
        TransportError::Curl(e)
    }
}

impl From<curl::FormError> for TransportError {
    fn from(e: curl::FormError) -> Self {
        TransportError::Form(e)
    }
}
