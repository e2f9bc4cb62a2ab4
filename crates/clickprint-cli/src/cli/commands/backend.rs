//! Shared setup: credentials, HTTP backend, file selection, batch run with Ctrl-C.

use anyhow::Result;
use clickprint_core::config::ClientConfig;
use clickprint_core::credentials::{CredentialProvider, EnvToken, TokenFile};
use clickprint_core::http::HttpBackend;
use clickprint_core::local_file::{guess_mime, LocalFile};
use clickprint_core::{BatchReport, UploadClient};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Token file from config (or `--token-file`), else `$CLICKPRINT_TOKEN`.
pub fn credentials(cfg: &ClientConfig) -> Arc<dyn CredentialProvider> {
    match &cfg.token_file {
        Some(path) => Arc::new(TokenFile::new(path.clone())),
        None => Arc::new(EnvToken),
    }
}

pub fn backend(cfg: &ClientConfig) -> Result<Arc<HttpBackend>> {
    Ok(Arc::new(HttpBackend::from_config(cfg, credentials(cfg))?))
}

/// Files that cannot be stat'ed are kept so the batch reports them as read failures.
pub fn select_files(paths: &[PathBuf]) -> Vec<LocalFile> {
    paths
        .iter()
        .map(|p| match LocalFile::from_path(p) {
            Ok(f) => f,
            Err(e) => {
                tracing::debug!("selecting {}: {:#}", p.display(), e);
                unselectable(p)
            }
        })
        .collect()
}

fn unselectable(path: &Path) -> LocalFile {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    LocalFile::new(path, name, 0, guess_mime(path))
}

/// Upload `paths` as one batch; Ctrl-C cancels files still in flight.
pub async fn run_batch(
    cfg: &ClientConfig,
    backend: Arc<HttpBackend>,
    paths: &[PathBuf],
    jobs: Option<usize>,
) -> BatchReport {
    let mut client = UploadClient::from_config(backend, cfg);
    if let Some(n) = jobs {
        client = client.with_max_concurrent(n);
    }

    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted; cancelling remaining files");
                cancel.cancel();
            }
        })
    };

    let report = client.upload_batch(select_files(paths), &cancel).await;
    watcher.abort();
    report
}
