//! ReportFlow CLI
//!
//! ## Usage
//!
//! ```bash
//! reportflow run <file.csv> --query '{"groupBy":["category"],"metrics":[{"op":"count"}]}'
//! reportflow run <file.csv> --query-file query.json --format csv
//! reportflow preview <file.csv> [--rows 20]
//! reportflow session
//! ```
//!
//! `<file.csv>` may also be a sample report id such as `sample-sample-invoices`,
//! resolved against `REPORTFLOW_DATA_DIR`.
//!
//! `session` reads one command per line from stdin until EOF or CTRL+C:
//!
//! ```text
//! upload <file.csv>
//! run <report-id|file.csv> <query json>
//! preview <report-id|file.csv> [rows]
//! ```
//!
//! Uploads are copied into `REPORTFLOW_UPLOAD_DIR` under a fresh report id and
//! stay addressable for `REPORT_TTL_SECS`. A cleanup worker removes expired
//! uploads every `CLEANUP_INTERVAL_SECS`.
//!
//! ## Environment Variables
//!
//! - REPORTFLOW_UPLOAD_DIR - Where session uploads are written (default: system temp dir)
//! - REPORTFLOW_DATA_DIR - Root of the sample files (default: data)
//! - REPORT_TTL_SECS - Upload lifetime (default: 3600)
//! - CLEANUP_INTERVAL_SECS - Sweep interval (default: 600)
//! - PREVIEW_ROWS - Default preview row count (default: 50)
//! - MAX_UPLOAD_BYTES - Upload size cap (default: 10485760)
//! - RUST_LOG - Logging level (optional, default: info)

use reportflow::csvutil;
use reportflow::engine::{self, EngineError, Query};
use reportflow::output::{self, OutputFormat};
use reportflow::reports::samples::SAMPLE_REPORT_PREFIX;
use reportflow::reports::{
    find_sample, locate_report, sample_path, save_upload, spawn_cleanup_worker, IntakeError,
    ReportStore,
};
use reportflow::ReportConfig;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const USAGE: &str = "usage:
  reportflow run <file|report-id> (--query <json> | --query-file <path>) [--format json|csv]
  reportflow preview <file|report-id> [--rows N]
  reportflow session";

enum CliError {
    /// Problem with the arguments, query or input file contents
    BadRequest(String),
    Internal(Box<dyn std::error::Error>),
}

impl From<EngineError> for CliError {
    fn from(err: EngineError) -> Self {
        if err.is_client_error() {
            CliError::BadRequest(err.to_string())
        } else {
            CliError::Internal(Box::new(err))
        }
    }
}

impl From<IntakeError> for CliError {
    fn from(err: IntakeError) -> Self {
        if err.is_client_error() {
            CliError::BadRequest(err.to_string())
        } else {
            CliError::Internal(Box::new(err))
        }
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    let idx = args.iter().position(|a| a == flag)?;
    args.get(idx + 1).map(|s| s.as_str())
}

fn not_found(target: &str) -> CliError {
    CliError::BadRequest(format!("no such file or report: {}", target))
}

/// One-shot commands see no uploads, so a target is a path or a sample id
fn resolve_input(config: &ReportConfig, target: &str) -> Result<PathBuf, CliError> {
    let path = PathBuf::from(target);
    if path.exists() {
        return Ok(path);
    }

    target
        .strip_prefix(SAMPLE_REPORT_PREFIX)
        .and_then(find_sample)
        .map(|sample| sample_path(&config.data_dir, sample))
        .ok_or_else(|| not_found(target))
}

/// Session commands resolve uploads and samples first, then plain paths
fn resolve_session_input(
    config: &ReportConfig,
    store: &ReportStore,
    target: &str,
) -> Result<PathBuf, CliError> {
    if let Some(path) = locate_report(store, &config.data_dir, target) {
        return Ok(path);
    }

    let path = PathBuf::from(target);
    if path.exists() {
        Ok(path)
    } else {
        Err(not_found(target))
    }
}

fn parse_query(raw: &str) -> Result<Query, CliError> {
    serde_json::from_str(raw)
        .map_err(|e| CliError::BadRequest(format!("invalid request body: {}", e)))
}

fn load_query(args: &[String]) -> Result<Query, CliError> {
    let raw = match (flag_value(args, "--query"), flag_value(args, "--query-file")) {
        (Some(json), _) => json.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map_err(|e| CliError::BadRequest(format!("cannot read query file {}: {}", path, e)))?,
        (None, None) => return Err(CliError::BadRequest("missing --query or --query-file".to_string())),
    };

    parse_query(&raw)
}

fn run_query(path: &Path, query: &Query, format: OutputFormat) -> Result<(), CliError> {
    log::info!("📊 Running report over {} ({} output)", path.display(), format.as_str());
    let response = engine::run_report(path, query)?;

    log::info!(
        "✅ {} result rows from {} scanned rows",
        response.rows.len(),
        response.rows_scanned
    );
    if response.scan.is_truncated() {
        log::warn!("⚠️  Scan stopped early: {:?}", response.scan);
    }

    output::write_response(&response, format, std::io::stdout().lock())
        .map_err(|e| CliError::Internal(Box::new(e)))
}

fn preview_file(path: &Path, rows: usize) -> Result<(), CliError> {
    let file = File::open(path).map_err(|e| CliError::Internal(Box::new(e)))?;
    let preview = csvutil::preview(file, rows).map_err(|e| CliError::BadRequest(e.to_string()))?;

    print_json(&preview)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    serde_json::to_writer_pretty(std::io::stdout().lock(), value)
        .map_err(|e| CliError::Internal(Box::new(e)))?;
    println!();
    Ok(())
}

fn parse_rows(value: Option<&str>, default: usize) -> Result<usize, CliError> {
    match value {
        Some(n) => n
            .parse::<usize>()
            .map_err(|_| CliError::BadRequest(format!("invalid row count: {}", n))),
        None => Ok(default),
    }
}

fn cmd_run(config: &ReportConfig, args: &[String]) -> Result<(), CliError> {
    let target = args
        .first()
        .ok_or_else(|| CliError::BadRequest("missing input file".to_string()))?;
    let path = resolve_input(config, target)?;
    let query = load_query(args)?;

    let format = match flag_value(args, "--format") {
        Some(name) => OutputFormat::from_str(name)
            .ok_or_else(|| CliError::BadRequest(format!("unknown format: {}", name)))?,
        None => OutputFormat::Json,
    };

    run_query(&path, &query, format)
}

fn cmd_preview(config: &ReportConfig, args: &[String]) -> Result<(), CliError> {
    let target = args
        .first()
        .ok_or_else(|| CliError::BadRequest("missing input file".to_string()))?;
    let path = resolve_input(config, target)?;
    let rows = parse_rows(flag_value(args, "--rows"), config.preview_rows)?;

    preview_file(&path, rows)
}

fn session_upload(config: &ReportConfig, store: &ReportStore, source: &str) -> Result<(), CliError> {
    let file = File::open(source)
        .map_err(|e| CliError::BadRequest(format!("cannot open {}: {}", source, e)))?;

    // the stored name keeps only the base name of `source`
    let receipt = save_upload(store, &config.upload_dir, source, file, config.intake_limits())?;
    print_json(&receipt)
}

fn session_command(config: &ReportConfig, store: &ReportStore, line: &str) -> Result<(), CliError> {
    let mut parts = line.splitn(3, char::is_whitespace);
    let command = parts.next().unwrap_or_default();
    let target = parts
        .next()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CliError::BadRequest(format!("missing argument for {:?}", command)))?;
    let rest = parts.next().map(str::trim).filter(|r| !r.is_empty());

    match command {
        "upload" => session_upload(config, store, target),
        "run" => {
            let path = resolve_session_input(config, store, target)?;
            let raw = rest.ok_or_else(|| CliError::BadRequest("missing query".to_string()))?;
            run_query(&path, &parse_query(raw)?, OutputFormat::Json)
        }
        "preview" => {
            let path = resolve_session_input(config, store, target)?;
            preview_file(&path, parse_rows(rest, config.preview_rows)?)
        }
        other => Err(CliError::BadRequest(format!("unknown command: {}", other))),
    }
}

async fn cmd_session(config: &ReportConfig) -> Result<(), CliError> {
    std::fs::create_dir_all(&config.upload_dir).map_err(|e| CliError::Internal(Box::new(e)))?;

    let store = Arc::new(ReportStore::new(config.store_ttl()));
    let cleanup = spawn_cleanup_worker(store.clone(), config.cleanup_interval);

    log::info!("🚀 Session started (uploads: {})", config.upload_dir.display());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => {
                log::info!("⚠️  Received CTRL+C, shutting down...");
                break;
            }
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                cleanup.abort();
                return Err(CliError::Internal(Box::new(e)));
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match session_command(config, &store, line) {
            Ok(()) => {}
            Err(CliError::BadRequest(msg)) => eprintln!("bad request: {}", msg),
            Err(CliError::Internal(e)) => log::error!("❌ {}", e),
        }
    }

    cleanup.abort();
    log::info!("✅ Session closed with {} registered reports", store.len());
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    dotenv::dotenv().ok();

    let config = ReportConfig::from_env();
    log::debug!("Configuration: {:?}", config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(|s| s.as_str()) {
        Some("run") => cmd_run(&config, &args[1..]),
        Some("preview") => cmd_preview(&config, &args[1..]),
        Some("session") => cmd_session(&config).await,
        _ => {
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::BadRequest(msg)) => {
            eprintln!("bad request: {}", msg);
            ExitCode::from(2)
        }
        Err(CliError::Internal(e)) => {
            log::error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config(upload_dir: &Path) -> ReportConfig {
        ReportConfig {
            upload_dir: upload_dir.to_path_buf(),
            data_dir: Path::new(env!("CARGO_MANIFEST_DIR")).join("data"),
            report_ttl: Duration::from_secs(3600),
            cleanup_interval: Duration::from_secs(600),
            preview_rows: 5,
            max_upload_bytes: 1024,
        }
    }

    #[test]
    fn test_resolve_input_maps_sample_ids() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = test_config(temp_dir.path());

        let path = resolve_input(&config, "sample-sample-invoices").ok();
        assert_eq!(path, Some(config.data_dir.join("samples").join("sample-invoices.csv")));

        assert!(resolve_input(&config, "sample-missing").is_err());
        assert!(resolve_input(&config, "sample-invoices").is_err());
    }

    #[test]
    fn test_session_upload_then_run_by_id() {
        let temp_dir = tempfile::tempdir().unwrap();
        let upload_dir = temp_dir.path().join("uploads");
        std::fs::create_dir_all(&upload_dir).unwrap();
        let config = test_config(&upload_dir);
        let store = ReportStore::new(config.store_ttl());

        let source = temp_dir.path().join("orders.csv");
        std::fs::write(&source, "region,amount\nEU,1\nUS,2\n").unwrap();

        let line = format!("upload {}", source.display());
        assert!(session_command(&config, &store, &line).is_ok());
        assert_eq!(store.len(), 1);

        let stored = std::fs::read_dir(&upload_dir)
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .file_name()
            .into_string()
            .unwrap();
        let report_id = stored.trim_end_matches("-orders.csv").to_string();

        let path = resolve_session_input(&config, &store, &report_id).ok();
        assert_eq!(path, Some(upload_dir.join(&stored)));

        let line = format!("run {} {{\"metrics\": [{{\"op\": \"count\"}}]}}", report_id);
        assert!(session_command(&config, &store, &line).is_ok());
        assert!(session_command(&config, &store, &format!("preview {} 1", report_id)).is_ok());
    }

    #[test]
    fn test_session_rejects_oversized_upload() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = test_config(temp_dir.path());
        let store = ReportStore::new(config.store_ttl());

        let source = temp_dir.path().join("big.csv");
        std::fs::write(&source, format!("a\n{}\n", "1".repeat(2048))).unwrap();

        let result = session_command(&config, &store, &format!("upload {}", source.display()));
        assert!(matches!(result, Err(CliError::BadRequest(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_session_command_errors() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = test_config(temp_dir.path());
        let store = ReportStore::new(config.store_ttl());

        for line in ["run", "frobnicate x", "run sample-sample-invoices", "run nope {}"] {
            assert!(
                matches!(session_command(&config, &store, line), Err(CliError::BadRequest(_))),
                "{}",
                line
            );
        }
    }
}
