//! Per-file outcomes and the batch report handed back to the caller.

use crate::digest::ContentHash;
use crate::error::FileError;
use crate::local_file::LocalFile;

/// Result of running one file through digest → probe → upload.
#[derive(Debug)]
pub struct UploadOutcome {
    /// Position of the file in the submitted batch.
    pub index: usize,
    pub file: LocalFile,
    /// Set whenever the digest stage succeeded, even if a later stage failed.
    pub hash: Option<ContentHash>,
    /// Bytes were sent to the store (false for a dedup hit).
    pub uploaded: bool,
    /// The existence probe failed and the upload went ahead anyway.
    pub probe_fell_back: bool,
    pub error: Option<FileError>,
}

impl UploadOutcome {
    pub(crate) fn new(index: usize, file: LocalFile) -> Self {
        Self {
            index,
            file,
            hash: None,
            uploaded: false,
            probe_fell_back: false,
            error: None,
        }
    }

    pub(crate) fn failed(index: usize, file: LocalFile, error: FileError) -> Self {
        let mut o = Self::new(index, file);
        o.error = Some(error);
        o
    }

    /// The file's hash is usable for job submission.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.hash.is_some()
    }
}

/// All outcomes of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    outcomes: Vec<UploadOutcome>,
}

impl BatchReport {
    /// Sorts by `index` so callers never depend on completion order.
    pub fn new(mut outcomes: Vec<UploadOutcome>) -> Self {
        outcomes.sort_by_key(|o| o.index);
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[UploadOutcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<UploadOutcome> {
        self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_success()).count()
    }

    pub fn uploaded_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.is_success() && o.uploaded)
            .count()
    }

    /// Files whose content the store already held.
    pub fn deduplicated_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.is_success() && !o.uploaded)
            .count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &UploadOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Every file's hash in input order, or `None` if any file failed.
    pub fn hashes(&self) -> Option<Vec<ContentHash>> {
        self.outcomes
            .iter()
            .map(|o| if o.is_success() { o.hash.clone() } else { None })
            .collect()
    }

    /// One line for the user, e.g. "2 of 5 files failed".
    pub fn summary(&self) -> String {
        let total = self.len();
        let failed = self.failed_count();
        if failed > 0 {
            format!("{} of {} files failed", failed, total)
        } else {
            format!(
                "all {} files ready ({} uploaded, {} already stored)",
                total,
                self.uploaded_count(),
                self.deduplicated_count()
            )
        }
    }
}
