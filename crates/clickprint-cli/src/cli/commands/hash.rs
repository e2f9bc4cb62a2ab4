//! `clickprint hash <paths..>` – print content hashes without contacting the backend.

use anyhow::{Context, Result};
use clickprint_core::digest;
use std::path::PathBuf;

/// Hash each file on the blocking pool; report every unreadable file, then fail.
pub async fn run_hash(paths: &[PathBuf]) -> Result<()> {
    let mut failed = 0usize;
    for path in paths {
        let p = path.clone();
        let res = tokio::task::spawn_blocking(move || digest::sha256_path(&p))
            .await
            .context("hashing task failed")?;
        match res {
            Ok(hash) => println!("{}  {}", hash, path.display()),
            Err(e) => {
                failed += 1;
                eprintln!("{}: {}", path.display(), e);
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{} of {} files could not be hashed", failed, paths.len());
    }
    Ok(())
}
