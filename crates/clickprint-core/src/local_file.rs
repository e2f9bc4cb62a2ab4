//! Local documents selected for printing.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const OCTET_STREAM: &str = "application/octet-stream";

/// Document types the print shops accept, keyed by lowercase extension.
const MIME_BY_EXTENSION: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("txt", "text/plain"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
];

/// A file on this device chosen by the user. Immutable once selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub path: PathBuf,
    /// Filename sent in the multipart part.
    pub display_name: String,
    pub byte_size: u64,
    pub mime_type: String,
}

impl LocalFile {
    pub fn new(
        path: impl Into<PathBuf>,
        display_name: impl Into<String>,
        byte_size: u64,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            display_name: display_name.into(),
            byte_size,
            mime_type: mime_type.into(),
        }
    }

    /// Select a file from disk: stat it, take its file name, guess its MIME type.
    pub fn from_path(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
        if !meta.is_file() {
            anyhow::bail!("{} is not a regular file", path.display());
        }
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Ok(Self::new(path, display_name, meta.len(), guess_mime(path)))
    }
}

/// MIME type from the file extension; unknown extensions are `application/octet-stream`.
pub fn guess_mime(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return OCTET_STREAM;
    };
    let ext = ext.to_ascii_lowercase();
    MIME_BY_EXTENSION
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, m)| *m)
        .unwrap_or(OCTET_STREAM)
}
