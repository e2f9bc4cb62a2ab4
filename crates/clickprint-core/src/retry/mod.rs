//! Retry and backoff policy for backend calls.
//!
//! Classifies transport failures (timeouts, connection errors, 5xx) and
//! decides whether a probe or upload gets another attempt. The default
//! allows a single retry.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::TransportError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
