//! `clickprint probe <hash>` – ask the backend whether it stores this hash.

use anyhow::{Context, Result};
use clickprint_core::config::ClientConfig;
use clickprint_core::probe;
use clickprint_core::retry::RetryPolicy;
use clickprint_core::ContentHash;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::backend;

pub async fn run_probe(cfg: &ClientConfig, hash: &str) -> Result<()> {
    let hash: ContentHash = hash.parse().context("parse hash")?;
    let store = backend::backend(cfg)?;
    let policy = RetryPolicy::from_config(cfg.retry.as_ref());
    let exists = probe::probe_exists(store, &hash, policy, Arc::new(AtomicBool::new(false)))
        .await
        .with_context(|| format!("probe {}", hash))?;
    println!("{}  {}", hash, if exists { "present" } else { "absent" });
    Ok(())
}
