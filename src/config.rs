//! Runtime configuration from environment variables

use crate::csvutil::DEFAULT_PREVIEW_ROWS;
use crate::reports::intake::{IntakeLimits, DEFAULT_MAX_UPLOAD_BYTES};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Loaded from environment variables with defaults for anything unset or unparsable.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    /// Where uploaded CSV files are written
    pub upload_dir: PathBuf,

    /// Root of the built-in sample files (`<data_dir>/samples/`)
    pub data_dir: PathBuf,

    /// How long an uploaded report stays registered
    pub report_ttl: Duration,

    /// How often the cleanup worker sweeps expired reports
    pub cleanup_interval: Duration,

    pub preview_rows: usize,

    pub max_upload_bytes: u64,
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

impl ReportConfig {
    /// Environment variables:
    /// - `REPORTFLOW_UPLOAD_DIR` (default: system temp dir)
    /// - `REPORTFLOW_DATA_DIR` (default: data)
    /// - `REPORT_TTL_SECS` (default: 3600)
    /// - `CLEANUP_INTERVAL_SECS` (default: 600)
    /// - `PREVIEW_ROWS` (default: 50)
    /// - `MAX_UPLOAD_BYTES` (default: 10485760)
    pub fn from_env() -> Self {
        Self {
            upload_dir: env::var("REPORTFLOW_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),

            data_dir: env::var("REPORTFLOW_DATA_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),

            report_ttl: Duration::from_secs(parsed_var("REPORT_TTL_SECS").unwrap_or(3600)),

            cleanup_interval: Duration::from_secs(
                parsed_var("CLEANUP_INTERVAL_SECS").unwrap_or(600),
            ),

            preview_rows: parsed_var("PREVIEW_ROWS").unwrap_or(DEFAULT_PREVIEW_ROWS),

            max_upload_bytes: parsed_var("MAX_UPLOAD_BYTES").unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        }
    }

    pub fn intake_limits(&self) -> IntakeLimits {
        IntakeLimits {
            max_bytes: self.max_upload_bytes,
            preview_rows: self.preview_rows,
        }
    }

    /// TTL for [`crate::reports::ReportStore::new`], saturating on absurd values
    pub fn store_ttl(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.report_ttl).unwrap_or(chrono::Duration::MAX)
    }
}
