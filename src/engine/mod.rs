//! Report Aggregation Engine
//!
//! Maps a declarative [`Query`] onto a streamed CSV file in a single pass and
//! produces formatted result rows plus a scan count.
//!
//! # Architecture
//!
//! ```text
//! header record → HeaderIndex → resolve(query) → ResolvedQuery
//!     ↓
//! for each data record: row_passes(filters) → group_key → GroupAggregator
//!     ↓
//! project (first-seen order, limit) → ReportResponse
//! ```
//!
//! Every call owns its reader and accumulators; nothing is shared between
//! concurrent calls.

pub mod accumulator;
pub mod error;
pub mod filter;
pub mod format;
pub mod resolver;
pub mod run;
pub mod types;

pub use error::{ColumnRole, EngineError};
pub use run::{run_report, run_report_from_reader};
pub use types::{FilterOp, FilterSpec, MetricOp, MetricSpec, Query, ReportResponse, ScanOutcome};
