//! ReportFlow - ad-hoc aggregation reports over CSV exports
//!
//! - [`engine`] runs a grouped count/sum/avg query over one CSV stream
//! - [`csvutil`] numeric inference and header/row previews
//! - [`reports`] registry of uploaded files with TTL cleanup and sample lookup
//! - [`config`] environment-driven settings
//! - [`output`] JSON/CSV rendering of results

pub mod config;
pub mod csvutil;
pub mod engine;
pub mod output;
pub mod reports;

pub use config::ReportConfig;
pub use engine::{run_report, run_report_from_reader, EngineError, Query, ReportResponse};
