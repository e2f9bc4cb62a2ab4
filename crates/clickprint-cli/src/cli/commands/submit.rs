//! `clickprint submit --shop <id> <paths..>` – upload, then request a print job.
//!
//! The job is only sent when every file in the batch has a hash on the server.

use anyhow::{Context, Result};
use clickprint_core::config::ClientConfig;
use clickprint_core::jobs::{JobRequest, PrintOptions};
use std::path::PathBuf;

use super::backend;
use super::report::print_report;
use crate::cli::args::{ColorArg, OrientationArg, PageRange, SidesArg};

#[derive(Debug, Clone)]
pub struct SubmitArgs {
    pub shop: String,
    pub color: ColorArg,
    pub orientation: OrientationArg,
    pub sides: SidesArg,
    pub pages: Option<PageRange>,
    pub copies: u32,
    pub jobs: Option<usize>,
}

impl SubmitArgs {
    fn print_options(&self) -> PrintOptions {
        PrintOptions {
            color_mode: self.color.into(),
            orientation: self.orientation.into(),
            pages: PageRange::selection(self.pages),
            copies: self.copies,
            sidedness: self.sides.into(),
        }
    }
}

pub async fn run_submit(cfg: &ClientConfig, paths: &[PathBuf], args: SubmitArgs) -> Result<()> {
    let store = backend::backend(cfg)?;
    let report = backend::run_batch(cfg, store.clone(), paths, args.jobs).await;
    print_report(&report);

    let request = JobRequest::from_report(&args.shop, &report, args.print_options())?;
    tracing::info!(shop = %request.shop_id, files = request.file_hashes.len(), "submitting print job");

    // Not retried: a job POST is not idempotent.
    let receipt = tokio::task::spawn_blocking(move || store.submit_job(&request))
        .await
        .context("job submission task failed")?
        .context("submit print job")?;

    match receipt.body.get("jobId").and_then(|v| v.as_str()) {
        Some(id) => println!("job {} accepted by shop {}", id, args.shop.trim()),
        None => println!("job accepted by shop {} (HTTP {})", args.shop.trim(), receipt.status),
    }
    Ok(())
}
