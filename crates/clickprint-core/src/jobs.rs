//! Print-job submission payload.
//!
//! A job references documents only by content hash. It can be built only
//! from a batch in which every file succeeded.

use serde::{Deserialize, Serialize};

use crate::outcome::BatchReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Color,
    Bw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sidedness {
    Single,
    Double,
}

/// Which pages to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelection {
    All,
    /// Inclusive, 1-based.
    Range { start: u32, end: u32 },
}

/// Print settings chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintOptions {
    pub color_mode: ColorMode,
    pub orientation: Orientation,
    pub pages: PageSelection,
    pub copies: u32,
    pub sidedness: Sidedness,
}

/// Why a job request could not be built from a batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobError {
    #[error("no documents selected")]
    NoDocuments,
    #[error("{failed} of {total} files failed; fix them before submitting")]
    IncompleteBatch { failed: usize, total: usize },
    #[error("shop id is empty")]
    MissingShop,
}

/// JSON body of `POST {base}/jobs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub shop_id: String,
    pub file_hashes: Vec<String>,
    pub color_mode: ColorMode,
    pub orientation: Orientation,
    /// `"all"` or `"custom"`.
    pub page_range: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_page: Option<u32>,
    pub number_of_copies: u32,
    pub sidedness: Sidedness,
}

impl JobRequest {
    /// Build a request only if every file in `report` produced a hash.
    pub fn from_report(
        shop_id: &str,
        report: &BatchReport,
        options: PrintOptions,
    ) -> Result<Self, JobError> {
        let shop_id = shop_id.trim();
        if shop_id.is_empty() {
            return Err(JobError::MissingShop);
        }
        if report.is_empty() {
            return Err(JobError::NoDocuments);
        }
        let hashes = report.hashes().ok_or(JobError::IncompleteBatch {
            failed: report.failed_count(),
            total: report.len(),
        })?;

        let (page_range, start_page, end_page) = match options.pages {
            PageSelection::All => ("all", None, None),
            PageSelection::Range { start, end } => ("custom", Some(start), Some(end)),
        };

        Ok(Self {
            shop_id: shop_id.to_string(),
            file_hashes: hashes.into_iter().map(|h| h.to_string()).collect(),
            color_mode: options.color_mode,
            orientation: options.orientation,
            page_range: page_range.to_string(),
            start_page,
            end_page,
            number_of_copies: options.copies,
            sidedness: options.sidedness,
        })
    }
}

/// Server response to a job submission.
#[derive(Debug, Clone, PartialEq)]
pub struct JobReceipt {
    pub status: u32,
    pub body: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::ContentHash;
    use crate::error::FileError;
    use crate::local_file::LocalFile;
    use crate::outcome::UploadOutcome;

    fn options(pages: PageSelection) -> PrintOptions {
        PrintOptions {
            color_mode: ColorMode::Bw,
            orientation: Orientation::Portrait,
            pages,
            copies: 2,
            sidedness: Sidedness::Double,
        }
    }

    fn outcome(index: usize, ok: bool) -> UploadOutcome {
        let file = LocalFile::new("/doc.pdf", "doc.pdf", 3, "application/pdf");
        if ok {
            let mut o = UploadOutcome::new(index, file);
            o.hash = Some(ContentHash::of_bytes(&[index as u8]));
            o.uploaded = true;
            o
        } else {
            UploadOutcome::failed(index, file, FileError::Cancelled)
        }
    }

    #[test]
    fn builds_request_with_camel_case_fields() {
        let report = BatchReport::new(vec![outcome(0, true), outcome(1, true)]);
        let req = JobRequest::from_report("shop-7", &report, options(PageSelection::All)).unwrap();
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["shopId"], "shop-7");
        assert_eq!(v["fileHashes"].as_array().unwrap().len(), 2);
        assert_eq!(v["colorMode"], "bw");
        assert_eq!(v["orientation"], "portrait");
        assert_eq!(v["pageRange"], "all");
        assert!(v.get("startPage").is_none());
        assert_eq!(v["numberOfCopies"], 2);
        assert_eq!(v["sidedness"], "double");
    }

    #[test]
    fn custom_range_carries_pages() {
        let report = BatchReport::new(vec![outcome(0, true)]);
        let req = JobRequest::from_report(
            "s",
            &report,
            options(PageSelection::Range { start: 3, end: 9 }),
        )
        .unwrap();
        assert_eq!(req.page_range, "custom");
        assert_eq!((req.start_page, req.end_page), (Some(3), Some(9)));
    }

    #[test]
    fn partial_failure_blocks_submission() {
        let report = BatchReport::new(vec![outcome(0, true), outcome(1, false), outcome(2, true)]);
        let err = JobRequest::from_report("s", &report, options(PageSelection::All)).unwrap_err();
        assert_eq!(err, JobError::IncompleteBatch { failed: 1, total: 3 });
    }

    #[test]
    fn empty_batch_or_shop_rejected() {
        let empty = BatchReport::default();
        assert_eq!(
            JobRequest::from_report("s", &empty, options(PageSelection::All)).unwrap_err(),
            JobError::NoDocuments
        );
        let report = BatchReport::new(vec![outcome(0, true)]);
        assert_eq!(
            JobRequest::from_report("  ", &report, options(PageSelection::All)).unwrap_err(),
            JobError::MissingShop
        );
    }
}
