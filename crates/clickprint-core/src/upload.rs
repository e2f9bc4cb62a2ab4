//! Conditional upload: send bytes only when the store lacks the hash.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::digest::DigestedFile;
use crate::error::{ProbeError, UploadError};
use crate::local_file::LocalFile;
use crate::probe::{probe_exists, Presence};
use crate::remote::{check_abort, ObjectStore};
use crate::retry::{run_with_retry, RetryPolicy, TransportError};

/// Upload `digested` unless `presence` says the store has it.
///
/// Returns `Ok(true)` when bytes were sent, `Ok(false)` when skipped. The
/// bytes sent are `digested.contents`, the buffer the hash was computed from.
/// Stores are keyed by content, so retrying a failed POST cannot create a
/// second distinct object.
///
/// Setting `abort` stops an in-flight request with
/// `UploadError::Transport(TransportError::Aborted)`. An upload the server
/// already answered keeps its real result.
pub async fn upload_if_absent(
    store: Arc<dyn ObjectStore>,
    file: &LocalFile,
    digested: &DigestedFile,
    presence: Presence,
    policy: RetryPolicy,
    verify_after_upload: bool,
    abort: Arc<AtomicBool>,
) -> Result<bool, UploadError> {
    let hash = &digested.hash;
    if presence.exists {
        debug!(%hash, name = %file.display_name, "already stored; skipping upload");
        return Ok(false);
    }

    let receipt = {
        let store = Arc::clone(&store);
        let file = file.clone();
        let hash = hash.clone();
        let contents = Arc::clone(&digested.contents);
        let abort = Arc::clone(&abort);
        tokio::task::spawn_blocking(move || {
            run_with_retry(&policy, "upload", || {
                check_abort(&abort)?;
                store.store(&file, &hash, &contents, &abort)
            })
        })
        .await
        .map_err(|e| UploadError::Task(e.to_string()))??
    };

    if let Some(server) = receipt.server_hash.as_deref() {
        if server != hash.as_str() {
            warn!(local = %hash, server, "server stored different content");
            return Err(UploadError::HashMismatch {
                local: hash.to_string(),
                server: server.to_string(),
            });
        }
    }
    if receipt.status == 200 {
        // Another client stored the same content between our probe and upload.
        debug!(%hash, "server already held object at upload time");
    }

    if verify_after_upload {
        // The bytes are already stored; an aborted check leaves the upload reported.
        match probe_exists(store, hash, policy, abort).await {
            Ok(true) => {}
            Ok(false) => return Err(UploadError::NotVisible(hash.to_string())),
            Err(ProbeError::Transport(TransportError::Aborted)) => {
                debug!(%hash, "post-upload check aborted");
            }
            Err(ProbeError::Transport(t)) => return Err(UploadError::Transport(t)),
            Err(ProbeError::Task(m)) => return Err(UploadError::Task(m)),
        }
    }

    info!(%hash, name = %file.display_name, bytes = digested.contents.len(), "uploaded");
    Ok(true)
}
