//! Report registry
//!
//! Tracks uploaded CSV files by opaque report id, removes them after their TTL
//! expires and resolves report ids (uploads or built-in samples) to file paths.
//! The aggregation engine never touches this module; callers resolve a path
//! here and hand it to [`crate::engine::run_report`].

pub mod cleanup;
pub mod intake;
pub mod samples;
pub mod store;

pub use cleanup::{cleanup_task, spawn_cleanup_worker};
pub use intake::{save_upload, IntakeError, IntakeLimits, UploadReceipt};
pub use samples::{find_sample, locate_report, sample_path, SampleFile, SAMPLE_FILES};
pub use store::{Report, ReportStore};
