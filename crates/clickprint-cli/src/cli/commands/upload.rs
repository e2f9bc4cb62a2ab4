//! `clickprint upload <paths..>` – upload what the backend does not already have.

use anyhow::Result;
use clickprint_core::config::ClientConfig;
use std::path::PathBuf;

use super::backend;
use super::report::print_report;

pub async fn run_upload(cfg: &ClientConfig, paths: &[PathBuf], jobs: Option<usize>) -> Result<()> {
    let store = backend::backend(cfg)?;
    let report = backend::run_batch(cfg, store, paths, jobs).await;
    print_report(&report);
    if !report.all_succeeded() {
        anyhow::bail!(report.summary());
    }
    Ok(())
}
