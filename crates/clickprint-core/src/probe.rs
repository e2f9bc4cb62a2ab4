//! Existence probe: does the store already hold an object with this hash?
//!
//! A failed probe is treated as "absent". Reporting "present" for an object
//! that was never stored would let a print job reference missing content,
//! so a probe failure costs an extra upload instead.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::digest::ContentHash;
use crate::error::ProbeError;
use crate::remote::{check_abort, ObjectStore};
use crate::retry::{run_with_retry, RetryPolicy, TransportError};

/// Probe result after applying the absent-on-failure rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presence {
    pub exists: bool,
    /// The probe failed and `exists` was assumed false.
    pub fell_back: bool,
}

/// One probe (with retry) on the blocking pool. Setting `abort` stops it
/// with `TransportError::Aborted`.
pub async fn probe_exists(
    store: Arc<dyn ObjectStore>,
    hash: &ContentHash,
    policy: RetryPolicy,
    abort: Arc<AtomicBool>,
) -> Result<bool, ProbeError> {
    let h = hash.clone();
    let exists = tokio::task::spawn_blocking(move || {
        run_with_retry(&policy, "existence probe", || {
            check_abort(&abort)?;
            store.exists(&h, &abort)
        })
    })
    .await
    .map_err(|e| ProbeError::Task(e.to_string()))??;
    Ok(exists)
}

/// Probe, converting any failure into `exists: false`.
///
/// An aborted probe also reads as absent; callers check their abort flag
/// before acting on the result.
pub async fn probe_or_assume_absent(
    store: Arc<dyn ObjectStore>,
    hash: &ContentHash,
    policy: RetryPolicy,
    abort: Arc<AtomicBool>,
) -> Presence {
    match probe_exists(store, hash, policy, abort).await {
        Ok(exists) => {
            debug!(%hash, exists, "probed object");
            Presence {
                exists,
                fell_back: false,
            }
        }
        Err(ProbeError::Transport(TransportError::Aborted)) => {
            debug!(%hash, "existence probe aborted");
            Presence {
                exists: false,
                fell_back: false,
            }
        }
        Err(e) => {
            warn!(%hash, "{}; assuming absent and uploading", e);
            Presence {
                exists: false,
                fell_back: true,
            }
        }
    }
}
