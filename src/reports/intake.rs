//! Upload intake: persist an uploaded CSV under a fresh report id

use super::store::{Report, ReportStore};
use crate::csvutil::{self, PreviewError};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use uuid::Uuid;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 << 20;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub report_id: String,
    pub file_name: String,
    pub size: u64,
    pub columns: Vec<String>,
    pub preview_rows: Vec<Vec<String>>,
}

#[derive(Debug)]
pub enum IntakeError {
    InvalidFileName(String),
    UnsupportedType(String),
    TooLarge { limit: u64 },
    Io(io::Error),
    Preview(PreviewError),
}

impl IntakeError {
    pub fn is_client_error(&self) -> bool {
        !matches!(self, IntakeError::Io(_))
    }
}

impl From<io::Error> for IntakeError {
    fn from(err: io::Error) -> Self {
        IntakeError::Io(err)
    }
}

impl From<PreviewError> for IntakeError {
    fn from(err: PreviewError) -> Self {
        IntakeError::Preview(err)
    }
}

impl std::fmt::Display for IntakeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntakeError::InvalidFileName(name) => write!(f, "invalid file name: {:?}", name),
            IntakeError::UnsupportedType(name) => {
                write!(f, "only .csv files are allowed, got {:?}", name)
            }
            IntakeError::TooLarge { limit } => write!(f, "file exceeds {} byte limit", limit),
            IntakeError::Io(e) => write!(f, "failed to save file: {}", e),
            IntakeError::Preview(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for IntakeError {}

#[derive(Debug, Clone, Copy)]
pub struct IntakeLimits {
    pub max_bytes: u64,
    pub preview_rows: usize,
}

impl Default for IntakeLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            preview_rows: csvutil::DEFAULT_PREVIEW_ROWS,
        }
    }
}

/// Base name of a client-supplied file name, without any directory part
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let base = Path::new(name).file_name()?.to_str()?;
    if base.is_empty() {
        None
    } else {
        Some(base.to_string())
    }
}

fn has_csv_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"))
}

/// Write `reader` to `<upload_dir>/<uuid>-<name>`, preview it and register it.
///
/// The report is only registered once the file is fully written and its
/// header parses; on any failure the partial file is removed.
pub fn save_upload<R: Read>(
    store: &ReportStore,
    upload_dir: &Path,
    file_name: &str,
    reader: R,
    limits: IntakeLimits,
) -> Result<UploadReceipt, IntakeError> {
    let name = sanitize_file_name(file_name)
        .ok_or_else(|| IntakeError::InvalidFileName(file_name.to_string()))?;
    if !has_csv_extension(&name) {
        return Err(IntakeError::UnsupportedType(name));
    }

    let report_id = Uuid::new_v4().to_string();
    let path = upload_dir.join(format!("{}-{}", report_id, name));

    let result = write_and_preview(&path, reader, limits);
    let (size, preview) = match result {
        Ok(ok) => ok,
        Err(e) => {
            if let Err(rm) = fs::remove_file(&path) {
                if rm.kind() != io::ErrorKind::NotFound {
                    log::warn!("Failed to remove rejected upload {}: {}", path.display(), rm);
                }
            }
            return Err(e);
        }
    };

    store.save(Report::new(report_id.clone(), path.clone()));
    log::info!("📥 Registered report {} ({} bytes) at {}", report_id, size, path.display());

    Ok(UploadReceipt {
        report_id,
        file_name: name,
        size,
        columns: preview.columns,
        preview_rows: preview.rows,
    })
}

fn write_and_preview<R: Read>(
    path: &Path,
    reader: R,
    limits: IntakeLimits,
) -> Result<(u64, csvutil::CsvPreview), IntakeError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let size = io::copy(&mut reader.take(limits.max_bytes + 1), &mut writer)?;
    if size > limits.max_bytes {
        return Err(IntakeError::TooLarge {
            limit: limits.max_bytes,
        });
    }

    writer.flush()?;
    writer.get_ref().sync_all()?;
    drop(writer);

    let preview = csvutil::preview(File::open(path)?, limits.preview_rows)?;
    Ok((size, preview))
}
