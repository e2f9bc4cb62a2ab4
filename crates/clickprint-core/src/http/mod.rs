//! HTTP backend for the remote object store and job submission.
//!
//! Uses the curl crate (libcurl) with one easy handle per request:
//! - `HEAD {base}/files/{hash}` for existence probes,
//! - multipart `POST {base}/files` for uploads,
//! - JSON `POST {base}/jobs` for print-job submission.
//!
//! Every call is blocking; run it from `spawn_blocking` in async code.

mod parse;

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::credentials::CredentialProvider;
use crate::digest::ContentHash;
use crate::jobs::{JobReceipt, JobRequest};
use crate::local_file::LocalFile;
use crate::remote::{ObjectStore, StoreReceipt};
use crate::retry::TransportError;

/// Talks to the print-shop backend over HTTP.
pub struct HttpBackend {
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
    connect_timeout: Duration,
    probe_timeout: Duration,
    upload_timeout: Duration,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpBackend {
    /// `base_url` must be an absolute http(s) URL; a trailing slash is ignored.
    pub fn new(base_url: &str, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        let parsed = url::Url::parse(base_url.trim())
            .with_context(|| format!("invalid API base URL {:?}", base_url))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            anyhow::bail!("API base URL must be http or https, got {}", parsed.scheme());
        }
        if parsed.cannot_be_a_base() {
            anyhow::bail!("API base URL {:?} cannot be a base", base_url);
        }
        let defaults = ClientConfig::default();
        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            credentials,
            connect_timeout: defaults.connect_timeout(),
            probe_timeout: defaults.probe_timeout(),
            upload_timeout: defaults.upload_timeout(),
        })
    }

    pub fn from_config(cfg: &ClientConfig, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        Ok(Self::new(&cfg.api_base_url, credentials)?.with_timeouts(
            cfg.connect_timeout(),
            cfg.probe_timeout(),
            cfg.upload_timeout(),
        ))
    }

    pub fn with_timeouts(mut self, connect: Duration, probe: Duration, upload: Duration) -> Self {
        self.connect_timeout = connect;
        self.probe_timeout = probe;
        self.upload_timeout = upload;
        self
    }

    pub fn files_url(&self) -> String {
        format!("{}/files", self.base_url)
    }

    pub fn object_url(&self, hash: &ContentHash) -> String {
        format!("{}/files/{}", self.base_url, hash)
    }

    pub fn jobs_url(&self) -> String {
        format!("{}/jobs", self.base_url)
    }

    /// Easy handle with URL, timeouts and the bearer header (plus `extra` headers).
    fn easy(
        &self,
        url: &str,
        timeout: Duration,
        extra: &[&str],
    ) -> Result<curl::easy::Easy, TransportError> {
        let token = self
            .credentials
            .bearer_token()
            .map_err(|e| TransportError::Credential(format!("{:#}", e)))?;

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(timeout)?;

        let mut list = curl::easy::List::new();
        list.append(&format!("Authorization: Bearer {}", token.trim()))?;
        for h in extra {
            list.append(h)?;
        }
        easy.http_headers(list)?;
        Ok(easy)
    }

    /// Perform the request, collecting the response body; returns (status, body).
    ///
    /// With `abort`, a progress callback stops the transfer once the flag is set.
    /// libcurl calls it at least once a second, also while waiting for a response.
    fn perform(
        easy: &mut curl::easy::Easy,
        abort: Option<&AtomicBool>,
    ) -> Result<(u32, Vec<u8>), TransportError> {
        if abort.is_some() {
            easy.progress(true)?;
        }
        let mut body = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            if let Some(flag) = abort {
                transfer.progress_function(move |_, _, _, _| !flag.load(Ordering::Relaxed))?;
            }
            if let Err(e) = transfer.perform() {
                if e.is_aborted_by_callback() {
                    return Err(TransportError::Aborted);
                }
                return Err(e.into());
            }
        }
        let code = easy.response_code()?;
        Ok((code, body))
    }

    /// Submit a print job referencing already-stored hashes.
    pub fn submit_job(&self, job: &JobRequest) -> Result<JobReceipt, TransportError> {
        let payload = serde_json::to_vec(job).map_err(TransportError::Encode)?;
        let mut easy = self.easy(
            &self.jobs_url(),
            self.upload_timeout,
            &["Content-Type: application/json", "Accept: application/json"],
        )?;
        easy.post(true)?;
        easy.post_fields_copy(&payload)?;
        let (code, body) = Self::perform(&mut easy, None)?;
        if !(200..300).contains(&code) {
            return Err(TransportError::Http(code));
        }
        let body = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|_| {
                serde_json::Value::String(String::from_utf8_lossy(&body).into_owned())
            })
        };
        Ok(JobReceipt { status: code, body })
    }
}

impl ObjectStore for HttpBackend {
    fn exists(&self, hash: &ContentHash, abort: &AtomicBool) -> Result<bool, TransportError> {
        let mut easy = self.easy(&self.object_url(hash), self.probe_timeout, &[])?;
        easy.nobody(true)?; // HEAD request
        let (code, _) = Self::perform(&mut easy, Some(abort))?;
        tracing::trace!(%hash, code, "HEAD object");
        // 200 means present; anything else (notably 404) means absent.
        Ok(code == 200)
    }

    fn store(
        &self,
        file: &LocalFile,
        hash: &ContentHash,
        contents: &[u8],
        abort: &AtomicBool,
    ) -> Result<StoreReceipt, TransportError> {
        // Empty `Expect:` stops libcurl waiting for `100 Continue` on larger bodies.
        let mut easy = self.easy(
            &self.files_url(),
            self.upload_timeout,
            &["Expect:", "Accept: application/json"],
        )?;

        // `Form::buffer` takes an owned Vec, so each attempt holds a second copy
        // of the file until the request ends (see `ClientConfig::max_file_bytes`).
        let mut form = curl::easy::Form::new();
        form.part("file")
            .buffer(file.display_name.as_str(), contents.to_vec())
            .content_type(&file.mime_type)
            .add()?;
        easy.httppost(form)?;

        let (code, body) = Self::perform(&mut easy, Some(abort))?;
        if !(200..300).contains(&code) {
            return Err(TransportError::Http(code));
        }
        let server_hash = match parse::parse_upload_response(&body) {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!(%hash, code, "upload response is not JSON ({}); trusting local hash", e);
                None
            }
        };
        Ok(StoreReceipt {
            status: code,
            server_hash,
        })
    }
}
