//! Content digests (SHA-256) for local documents.
//!
//! A file is read once into memory and hashed; the same buffer is later
//! handed to the uploader, so the uploaded bytes are exactly the hashed bytes.

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::DigestError;
use crate::local_file::LocalFile;

const BUF_SIZE: usize = 64 * 1024;

/// Length of a hex-encoded SHA-256 digest.
pub const HASH_HEX_LEN: usize = 64;

/// Lowercase hex SHA-256 of a file's bytes. The sole remote identifier of a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn of_bytes(data: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(data)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returned when a string is not a 64-character hex digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid content hash {0:?}: expected 64 hex characters")]
pub struct InvalidHash(pub String);

impl FromStr for ContentHash {
    type Err = InvalidHash;

    /// Accepts upper or lower case; stores lowercase.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != HASH_HEX_LEN || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(InvalidHash(s.to_string()));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }
}

/// A file's bytes together with their digest.
#[derive(Debug, Clone)]
pub struct DigestedFile {
    pub hash: ContentHash,
    pub contents: Arc<Vec<u8>>,
}

/// Read the whole file (bounded by `max_bytes`) and hash it.
pub fn read_and_hash(path: &Path, max_bytes: u64) -> Result<DigestedFile, DigestError> {
    let read_err = |source: std::io::Error| DigestError::Read {
        path: path.to_path_buf(),
        source,
    };
    let f = File::open(path).map_err(read_err)?;
    let mut contents = Vec::new();
    // One byte past the limit tells us the file is too large without reading all of it.
    f.take(max_bytes.saturating_add(1))
        .read_to_end(&mut contents)
        .map_err(read_err)?;
    if contents.len() as u64 > max_bytes {
        return Err(DigestError::TooLarge {
            path: path.to_path_buf(),
            limit: max_bytes,
        });
    }
    let hash = ContentHash::of_bytes(&contents);
    Ok(DigestedFile {
        hash,
        contents: Arc::new(contents),
    })
}

/// Async wrapper: reads and hashes on the blocking pool.
/// A lost or panicked hashing task surfaces as `DigestError::Hashing`.
pub async fn digest_file(file: &LocalFile, max_bytes: u64) -> Result<DigestedFile, DigestError> {
    let path: PathBuf = file.path.clone();
    tokio::task::spawn_blocking(move || read_and_hash(&path, max_bytes))
        .await
        .map_err(|e| DigestError::Hashing(e.to_string()))?
}

/// Compute SHA-256 of a file and return the digest as lowercase hex.
/// Reads in chunks to keep memory use bounded; suitable for large files.
pub fn sha256_path(path: &Path) -> Result<ContentHash, DigestError> {
    let read_err = |source: std::io::Error| DigestError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut f = File::open(path).map_err(read_err)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f.read(&mut buf).map_err(read_err)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(ContentHash(hex::encode(hasher.finalize())))
}
