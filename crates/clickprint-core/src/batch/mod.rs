//! Batch orchestration: run every selected file through the pipeline.
//!
//! All per-file pipelines are spawned up front on a `JoinSet`, bounded by a
//! semaphore, and the report is built only after every task has settled.
//! Outcomes are matched to files by index, never by completion order.
//!
//! Cancellation is relayed into a shared abort flag that the store checks
//! inside each request, so a cancelled batch stops its transfers instead of
//! leaving them running behind a reported `Cancelled`.

mod locks;
mod pipeline;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::error::FileError;
use crate::local_file::LocalFile;
use crate::outcome::{BatchReport, UploadOutcome};
use crate::remote::ObjectStore;
use crate::retry::RetryPolicy;

use locks::HashLocks;

/// Content-addressed upload client over any [`ObjectStore`].
#[derive(Clone)]
pub struct UploadClient {
    store: Arc<dyn ObjectStore>,
    retry: RetryPolicy,
    max_file_bytes: u64,
    max_concurrent: usize,
    verify_after_upload: bool,
}

impl UploadClient {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self::from_config(store, &ClientConfig::default())
    }

    pub fn from_config(store: Arc<dyn ObjectStore>, cfg: &ClientConfig) -> Self {
        Self {
            store,
            retry: RetryPolicy::from_config(cfg.retry.as_ref()),
            max_file_bytes: cfg.max_file_bytes,
            max_concurrent: cfg.max_concurrent_uploads.max(1),
            verify_after_upload: cfg.verify_after_upload,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }

    pub fn with_verify_after_upload(mut self, verify: bool) -> Self {
        self.verify_after_upload = verify;
        self
    }

    pub fn with_max_file_bytes(mut self, max: u64) -> Self {
        self.max_file_bytes = max;
        self
    }

    /// Run a single file through the pipeline.
    pub async fn upload_file(&self, file: LocalFile) -> UploadOutcome {
        let abort = Arc::new(AtomicBool::new(false));
        pipeline::process_file(self, 0, file, None, &abort).await
    }

    /// Run every file concurrently and return one outcome per file, in input order.
    ///
    /// When `cancel` fires, queued files and in-flight requests resolve to
    /// `FileError::Cancelled`. A file whose upload the server already answered
    /// keeps its real result.
    pub async fn upload_batch(&self, files: Vec<LocalFile>, cancel: &CancellationToken) -> BatchReport {
        let total = files.len();
        let locks = Arc::new(HashLocks::default());
        let permits = Arc::new(Semaphore::new(self.max_concurrent));
        let abort = Arc::new(AtomicBool::new(cancel.is_cancelled()));
        let relay = {
            let cancel = cancel.clone();
            let abort = Arc::clone(&abort);
            tokio::spawn(async move {
                cancel.cancelled().await;
                abort.store(true, Ordering::Relaxed);
            })
        };
        let mut join_set = JoinSet::new();

        for (index, file) in files.iter().cloned().enumerate() {
            let client = self.clone();
            let locks = Arc::clone(&locks);
            let permits = Arc::clone(&permits);
            let abort = Arc::clone(&abort);
            let cancel = cancel.clone();
            join_set.spawn(async move {
                let _permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        return UploadOutcome::failed(index, file, FileError::Cancelled);
                    }
                    permit = permits.acquire_owned() => permit.ok(),
                };
                pipeline::process_file(&client, index, file, Some(locks.as_ref()), &abort).await
            });
        }

        let mut slots: Vec<Option<UploadOutcome>> = (0..total).map(|_| None).collect();
        while let Some(res) = join_set.join_next().await {
            match res {
                Ok(outcome) => {
                    let i = outcome.index;
                    slots[i] = Some(outcome);
                }
                Err(e) => warn!("upload task ended abnormally: {}", e),
            }
        }

        let outcomes = slots
            .into_iter()
            .zip(files)
            .enumerate()
            .map(|(i, (slot, file))| {
                slot.unwrap_or_else(|| {
                    UploadOutcome::failed(i, file, FileError::Internal("task did not complete".into()))
                })
            })
            .collect();
        relay.abort();
        let report = BatchReport::new(outcomes);
        info!("batch finished: {}", report.summary());
        report
    }
}
