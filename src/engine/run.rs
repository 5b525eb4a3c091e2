//! Resolve → (filter → key → accumulate)* → project

use super::accumulator::{group_key, GroupAggregator};
use super::error::EngineError;
use super::filter::{row_passes, ResolvedFilter};
use super::format::{column_names, project};
use super::resolver::{resolve, HeaderIndex};
use super::types::{Query, ReportResponse, ScanOutcome};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Raw bytes are compacted once this much has been consumed
const TAIL_COMPACT_BYTES: usize = 64 * 1024;

/// Open `path` and run `query` over it
pub fn run_report(path: impl AsRef<Path>, query: &Query) -> Result<ReportResponse, EngineError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    log::debug!("Running report over {}", path.display());
    run_report_from_reader(BufReader::new(file), query)
}

/// Run `query` over a CSV stream whose first record is the header.
///
/// Only header and query validation errors are returned as `Err`. A malformed
/// data record stops the scan and the groups built so far are still returned,
/// flagged through [`ScanOutcome::TruncatedByError`].
///
/// The csv parser accepts a quoted field that is still open at end of input
/// and returns the rest of the file as that field. Rows are therefore
/// accumulated one record behind the reader, so the final record can be
/// dropped (and the scan marked truncated) when its raw bytes leave a quote
/// open.
pub fn run_report_from_reader<R: Read>(
    reader: R,
    query: &Query,
) -> Result<ReportResponse, EngineError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(RecordTail::new(reader));

    let mut current = StringRecord::new();
    if !csv_reader.read_record(&mut current)? {
        return Err(EngineError::EmptyInput);
    }
    let header_start = record_start(&current);

    let header = HeaderIndex::new(current.iter());
    let resolved = resolve(&header, query)?;
    let filters = resolved.filters;
    let group_by = resolved.group_by;

    let mut aggregator = GroupAggregator::new(resolved.metrics);
    let mut rows_scanned: u64 = 0;
    let mut scan = ScanOutcome::Completed;

    let mut next = StringRecord::new();
    let mut has_current = false;

    loop {
        match csv_reader.read_record(&mut next) {
            Ok(true) => {
                if has_current {
                    rows_scanned += 1;
                    accumulate(&filters, &group_by, &mut aggregator, &current);
                }
                std::mem::swap(&mut current, &mut next);
                has_current = true;
                csv_reader.get_mut().discard_before(record_start(&current));
            }
            Ok(false) => {
                if !has_current {
                    if csv_reader.get_ref().has_open_quote(header_start) {
                        return Err(EngineError::UnterminatedHeader);
                    }
                    break;
                }

                if csv_reader.get_ref().has_open_quote(record_start(&current)) {
                    let line = current.position().map(|p| p.line());
                    log::warn!(
                        "Stopping scan after {} rows: unterminated quoted field at line {:?}",
                        rows_scanned,
                        line
                    );
                    scan = ScanOutcome::TruncatedByError {
                        line,
                        message: "unterminated quoted field".to_string(),
                    };
                } else {
                    rows_scanned += 1;
                    accumulate(&filters, &group_by, &mut aggregator, &current);
                }
                break;
            }
            Err(e) => {
                if has_current {
                    rows_scanned += 1;
                    accumulate(&filters, &group_by, &mut aggregator, &current);
                }

                let line = e.position().map(|p| p.line());
                log::warn!(
                    "Stopping scan after {} rows: error reading csv row: {}",
                    rows_scanned,
                    e
                );
                scan = ScanOutcome::TruncatedByError {
                    line,
                    message: e.to_string(),
                };
                break;
            }
        }
    }

    log::debug!(
        "Scanned {} rows into {} groups ({:?})",
        rows_scanned,
        aggregator.group_count(),
        scan
    );

    let metrics = aggregator.metrics().to_vec();
    let rows = project(aggregator.into_groups(), &metrics, query.effective_limit());

    Ok(ReportResponse {
        columns: column_names(query),
        rows,
        rows_scanned,
        scan,
    })
}

fn accumulate(
    filters: &[ResolvedFilter],
    group_by: &[usize],
    aggregator: &mut GroupAggregator,
    row: &StringRecord,
) {
    if !row_passes(filters, row) {
        return;
    }

    let key = group_key(group_by, row);
    aggregator.add_row(key, row);
}

fn record_start(record: &StringRecord) -> u64 {
    record.position().map_or(0, |p| p.byte())
}

/// Read adapter that keeps the raw bytes handed to the csv parser, from the
/// start of the record being held back up to whatever has been read so far.
struct RecordTail<R> {
    inner: R,
    buf: Vec<u8>,
    /// Absolute stream offset of `buf[0]`
    start: u64,
}

impl<R> RecordTail<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            start: 0,
        }
    }

    fn discard_before(&mut self, offset: u64) {
        let consumed = self.local(offset);
        if consumed >= TAIL_COMPACT_BYTES {
            self.buf.drain(..consumed);
            self.start += consumed as u64;
        }
    }

    /// Odd number of `"` between `offset` and the end of what was read
    fn has_open_quote(&self, offset: u64) -> bool {
        let from = self.local(offset);
        self.buf[from..].iter().filter(|&&b| b == b'"').count() % 2 == 1
    }

    fn local(&self, offset: u64) -> usize {
        let rel = offset.saturating_sub(self.start);
        usize::try_from(rel).map_or(self.buf.len(), |rel| rel.min(self.buf.len()))
    }
}

impl<R: Read> Read for RecordTail<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(out)?;
        self.buf.extend_from_slice(&out[..n]);
        Ok(n)
    }
}
