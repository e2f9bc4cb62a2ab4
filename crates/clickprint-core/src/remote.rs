//! Remote object store interface.
//!
//! The upload pipeline only depends on this trait; the HTTP backend is one
//! implementation, test fakes are another. Each call is a single blocking
//! attempt; retries are applied by the caller.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::digest::ContentHash;
use crate::local_file::LocalFile;
use crate::retry::TransportError;

/// What the server said about a successful store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreReceipt {
    /// HTTP status of the upload response (2xx).
    pub status: u32,
    /// Hash echoed by the server, if the response carried one.
    pub server_hash: Option<String>,
}

/// Content-addressed store keyed by [`ContentHash`].
///
/// Both calls take an abort flag. Once it is set, a request still in flight
/// should stop and return `TransportError::Aborted`; a request that already
/// completed returns its real result.
pub trait ObjectStore: Send + Sync {
    /// Metadata-only existence check. `Ok(false)` for any non-200 status.
    fn exists(&self, hash: &ContentHash, abort: &AtomicBool) -> Result<bool, TransportError>;

    /// Store `contents` (the bytes that produced `hash`) under the file's name and MIME type.
    /// Non-2xx responses are `Err(TransportError::Http(status))`.
    fn store(
        &self,
        file: &LocalFile,
        hash: &ContentHash,
        contents: &[u8],
        abort: &AtomicBool,
    ) -> Result<StoreReceipt, TransportError>;
}

/// `Err(Aborted)` if `abort` is set. Checked before each attempt.
pub fn check_abort(abort: &AtomicBool) -> Result<(), TransportError> {
    if abort.load(Ordering::Relaxed) {
        return Err(TransportError::Aborted);
    }
    Ok(())
}
