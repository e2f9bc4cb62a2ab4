//! One file's pipeline: digest → probe → conditional upload.
//!
//! Stage errors are recorded on the outcome; nothing here returns early with
//! an error that could reach sibling files. The abort flag is checked between
//! stages; a request already in flight is stopped by the store itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::digest::digest_file;
use crate::error::{FileError, UploadError};
use crate::local_file::LocalFile;
use crate::outcome::UploadOutcome;
use crate::probe::probe_or_assume_absent;
use crate::retry::TransportError;
use crate::upload::upload_if_absent;

use super::locks::HashLocks;
use super::UploadClient;

pub(super) async fn process_file(
    client: &UploadClient,
    index: usize,
    file: LocalFile,
    locks: Option<&HashLocks>,
    abort: &Arc<AtomicBool>,
) -> UploadOutcome {
    let mut outcome = UploadOutcome::new(index, file);
    if cancelled(&mut outcome, abort) {
        return outcome;
    }

    let digested = match digest_file(&outcome.file, client.max_file_bytes).await {
        Ok(d) => d,
        Err(e) => {
            warn!(index, name = %outcome.file.display_name, "digest failed: {}", e);
            outcome.error = Some(e.into());
            return outcome;
        }
    };
    outcome.hash = Some(digested.hash.clone());

    let _guard = match locks {
        Some(l) => Some(l.acquire(&digested.hash).await),
        None => None,
    };
    if cancelled(&mut outcome, abort) {
        return outcome;
    }

    let presence = probe_or_assume_absent(
        Arc::clone(&client.store),
        &digested.hash,
        client.retry,
        Arc::clone(abort),
    )
    .await;
    if cancelled(&mut outcome, abort) {
        return outcome;
    }
    outcome.probe_fell_back = presence.fell_back;

    match upload_if_absent(
        Arc::clone(&client.store),
        &outcome.file,
        &digested,
        presence,
        client.retry,
        client.verify_after_upload,
        Arc::clone(abort),
    )
    .await
    {
        Ok(uploaded) => outcome.uploaded = uploaded,
        Err(UploadError::Transport(TransportError::Aborted)) => {
            debug!(index, hash = %digested.hash, "upload aborted");
            outcome.error = Some(FileError::Cancelled);
        }
        Err(e) => {
            warn!(index, hash = %digested.hash, name = %outcome.file.display_name, "upload failed: {}", e);
            outcome.error = Some(e.into());
        }
    }
    outcome
}

/// Marks the outcome cancelled if `abort` is set.
fn cancelled(outcome: &mut UploadOutcome, abort: &AtomicBool) -> bool {
    if abort.load(Ordering::Relaxed) {
        debug!(index = outcome.index, name = %outcome.file.display_name, "cancelled");
        outcome.error = Some(FileError::Cancelled);
        return true;
    }
    false
}
