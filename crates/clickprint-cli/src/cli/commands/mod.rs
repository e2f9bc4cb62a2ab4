//! CLI command handlers, one per file.

mod backend;
mod completions;
mod hash;
mod probe;
mod report;
mod submit;
mod upload;

pub use completions::{run_completions, run_man};
pub use hash::run_hash;
pub use probe::run_probe;
pub use submit::{run_submit, SubmitArgs};
pub use upload::run_upload;
