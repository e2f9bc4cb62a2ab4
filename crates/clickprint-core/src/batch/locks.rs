//! Per-hash locks so files with identical content are probed one at a time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OwnedMutexGuard;

use crate::digest::ContentHash;

/// Lock table scoped to one batch. Holding a hash's guard across probe and
/// upload means a later file with the same hash probes after the earlier
/// upload has landed.
#[derive(Debug, Default)]
pub(crate) struct HashLocks {
    inner: Mutex<HashMap<ContentHash, Arc<tokio::sync::Mutex<()>>>>,
}

impl HashLocks {
    pub(crate) async fn acquire(&self, hash: &ContentHash) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(map.entry(hash.clone()).or_default())
        };
        lock.lock_owned().await
    }
}
