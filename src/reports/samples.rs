//! Built-in sample datasets and report id lookup

use super::store::ReportStore;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Report ids with this prefix address a sample file instead of an upload
pub const SAMPLE_REPORT_PREFIX: &str = "sample-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleFile {
    pub id: &'static str,
    pub file_name: &'static str,
    pub title: &'static str,
    pub rows: usize,
}

pub static SAMPLE_FILES: [SampleFile; 2] = [
    SampleFile {
        id: "sample-invoices",
        file_name: "sample-invoices.csv",
        title: "Invoices (ERP export)",
        rows: 50,
    },
    SampleFile {
        id: "sample-payments",
        file_name: "sample-payments.csv",
        title: "Payments (ERP export)",
        rows: 80,
    },
];

pub fn find_sample(id: &str) -> Option<&'static SampleFile> {
    SAMPLE_FILES.iter().find(|s| s.id == id)
}

pub fn sample_path(data_dir: &Path, sample: &SampleFile) -> PathBuf {
    data_dir.join("samples").join(sample.file_name)
}

/// Resolve a report id to the CSV file it refers to.
///
/// Registered uploads win; otherwise `sample-<sampleId>` maps into the sample
/// catalog (so `sample-sample-invoices` is the invoices sample).
pub fn locate_report(store: &ReportStore, data_dir: &Path, report_id: &str) -> Option<PathBuf> {
    if let Some(report) = store.get(report_id) {
        return Some(report.file_path);
    }

    let sample_id = report_id.strip_prefix(SAMPLE_REPORT_PREFIX)?;
    find_sample(sample_id).map(|sample| sample_path(data_dir, sample))
}
