//! In-memory `ObjectStore` with call counters and failure switches.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use clickprint_core::digest::ContentHash;
use clickprint_core::local_file::LocalFile;
use clickprint_core::remote::{ObjectStore, StoreReceipt};
use clickprint_core::retry::TransportError;

#[derive(Default)]
pub struct FakeStore {
    objects: Mutex<HashMap<ContentHash, (String, Vec<u8>)>>,
    pub exists_calls: AtomicUsize,
    pub store_calls: AtomicUsize,
    /// Every probe fails with a connection error.
    pub probe_fails: AtomicBool,
    /// Every store fails with HTTP 500.
    pub store_fails: AtomicBool,
    /// Number of upcoming stores that fail with HTTP 503 before succeeding.
    pub store_transient_failures: AtomicUsize,
    /// Accept stores but never report the object as present.
    pub forget_stores: AtomicBool,
    /// Hash echoed back in the receipt instead of the real one.
    pub echo_hash: Mutex<Option<String>>,
    /// Each store takes this long before the object lands.
    pub store_delay: Mutex<Option<Duration>>,
    /// Keep going through a delayed store even after the abort flag is set.
    pub ignore_abort: AtomicBool,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preload(&self, contents: &[u8]) -> ContentHash {
        let hash = ContentHash::of_bytes(contents);
        self.objects
            .lock()
            .unwrap()
            .insert(hash.clone(), ("preloaded".to_string(), contents.to_vec()));
        hash
    }

    pub fn stored(&self, hash: &ContentHash) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(hash).map(|(_, b)| b.clone())
    }

    pub fn stored_name(&self, hash: &ContentHash) -> Option<String> {
        self.objects.lock().unwrap().get(hash).map(|(n, _)| n.clone())
    }

    pub fn exists_count(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }

    pub fn store_count(&self) -> usize {
        self.store_calls.load(Ordering::SeqCst)
    }

    /// Sleep through `store_delay` in small steps, stopping early on abort.
    fn wait_or_abort(&self, abort: &AtomicBool) -> Result<(), TransportError> {
        let Some(delay) = *self.store_delay.lock().unwrap() else {
            return Ok(());
        };
        let deadline = Instant::now() + delay;
        while Instant::now() < deadline {
            if abort.load(Ordering::SeqCst) && !self.ignore_abort.load(Ordering::SeqCst) {
                return Err(TransportError::Aborted);
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        Ok(())
    }
}

impl ObjectStore for FakeStore {
    fn exists(&self, hash: &ContentHash, _abort: &AtomicBool) -> Result<bool, TransportError> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        if self.probe_fails.load(Ordering::SeqCst) {
            // CURLE_COULDNT_CONNECT
            return Err(TransportError::Curl(curl::Error::new(7)));
        }
        Ok(self.objects.lock().unwrap().contains_key(hash))
    }

    fn store(
        &self,
        file: &LocalFile,
        hash: &ContentHash,
        contents: &[u8],
        abort: &AtomicBool,
    ) -> Result<StoreReceipt, TransportError> {
        self.store_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_or_abort(abort)?;
        if self.store_fails.load(Ordering::SeqCst) {
            return Err(TransportError::Http(500));
        }
        let remaining = self.store_transient_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.store_transient_failures
                .store(remaining - 1, Ordering::SeqCst);
            return Err(TransportError::Http(503));
        }
        let actual = ContentHash::of_bytes(contents);
        if !self.forget_stores.load(Ordering::SeqCst) {
            self.objects
                .lock()
                .unwrap()
                .insert(actual.clone(), (file.display_name.clone(), contents.to_vec()));
        }
        let echoed = self
            .echo_hash
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| actual.to_string());
        assert_eq!(&actual, hash, "uploaded bytes must match the probed hash");
        Ok(StoreReceipt {
            status: 202,
            server_hash: Some(echoed),
        })
    }
}
