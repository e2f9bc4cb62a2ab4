//! Error taxonomy for the upload pipeline.
//!
//! Stage errors (digest, probe, upload) are caught inside a file's pipeline
//! and stored on that file's outcome as a [`FileError`]; they never abort
//! sibling files.

use std::path::PathBuf;

use crate::retry::TransportError;

/// Digest stage failure.
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} exceeds the {limit}-byte upload limit", .path.display())]
    TooLarge { path: PathBuf, limit: u64 },
    #[error("hashing failed: {0}")]
    Hashing(String),
}

/// Existence probe failure. Callers recover by assuming the object is absent.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("existence probe failed: {0}")]
    Transport(#[from] TransportError),
    #[error("existence probe task failed: {0}")]
    Task(String),
}

/// Upload stage failure. Fatal for the file.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("upload transport: {0}")]
    Transport(TransportError),
    #[error("upload rejected with HTTP {0}")]
    Status(u32),
    #[error("server stored hash {server}, expected {local}")]
    HashMismatch { local: String, server: String },
    #[error("object {0} not visible after upload")]
    NotVisible(String),
    #[error("upload task failed: {0}")]
    Task(String),
}

impl From<TransportError> for UploadError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Http(code) => UploadError::Status(code),
            other => UploadError::Transport(other),
        }
    }
}

/// Why a single file's pipeline did not produce a usable hash.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error(transparent)]
    Digest(#[from] DigestError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("cancelled")]
    Cancelled,
    #[error("pipeline task failed: {0}")]
    Internal(String),
}

impl FileError {
    /// Short machine-friendly label for summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            FileError::Digest(DigestError::Read { .. }) => "read",
            FileError::Digest(DigestError::TooLarge { .. }) => "too-large",
            FileError::Digest(DigestError::Hashing(_)) => "hashing",
            FileError::Upload(_) => "upload",
            FileError::Cancelled => "cancelled",
            FileError::Internal(_) => "internal",
        }
    }
}
