pub mod config;
pub mod logging;

// Upload pipeline: digest → probe → conditional upload, per file; batch on top.
pub mod batch;
pub mod credentials;
pub mod digest;
pub mod error;
pub mod http;
pub mod jobs;
pub mod local_file;
pub mod outcome;
pub mod probe;
pub mod remote;
pub mod retry;
pub mod upload;

pub use batch::UploadClient;
pub use digest::ContentHash;
pub use local_file::LocalFile;
pub use outcome::{BatchReport, UploadOutcome};
