//! In-memory registry of uploaded report files with TTL expiry

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Metadata for one uploaded CSV file
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub id: String,
    pub file_path: PathBuf,
    pub created_at: DateTime<Utc>,
}

impl Report {
    pub fn new(id: String, file_path: PathBuf) -> Self {
        Self {
            id,
            file_path,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at > ttl
    }
}

struct Inner {
    reports: HashMap<String, Report>,
    ttl: Duration,
}

/// Report id → file registry.
///
/// Shared through `Arc<ReportStore>` between request handlers and the
/// cleanup worker. Expired entries are only removed by [`ReportStore::sweep_expired`].
pub struct ReportStore {
    inner: RwLock<Inner>,
}

impl ReportStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(Inner {
                reports: HashMap::new(),
                ttl,
            }),
        }
    }

    // A poisoned lock only means another thread panicked mid-update; the map is still usable.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn ttl(&self) -> Duration {
        self.read().ttl
    }

    pub fn set_ttl(&self, ttl: Duration) {
        self.write().ttl = ttl;
    }

    /// Insert or replace by id
    pub fn save(&self, report: Report) {
        self.write().reports.insert(report.id.clone(), report);
    }

    pub fn get(&self, id: &str) -> Option<Report> {
        self.read().reports.get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> Option<Report> {
        self.write().reports.remove(id)
    }

    pub fn clear(&self) {
        self.write().reports.clear();
    }

    pub fn len(&self) -> usize {
        self.read().reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().reports.is_empty()
    }

    /// Delete every report older than the TTL, file first, then the entry.
    ///
    /// A file that is already gone is not an error. Other removal failures are
    /// logged and the entry is dropped anyway. Returns the removed ids.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> Vec<String> {
        let mut inner = self.write();
        let ttl = inner.ttl;

        let expired: Vec<String> = inner
            .reports
            .values()
            .filter(|r| r.is_expired(now, ttl))
            .map(|r| r.id.clone())
            .collect();

        for id in &expired {
            if let Some(report) = inner.reports.remove(id) {
                log::info!(
                    "🧹 Cleaning up expired report: {} (path: {})",
                    id,
                    report.file_path.display()
                );
                if let Err(e) = std::fs::remove_file(&report.file_path) {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        log::warn!(
                            "Error removing expired report file {}: {}",
                            report.file_path.display(),
                            e
                        );
                    }
                }
            }
        }

        expired
    }
}

impl Default for ReportStore {
    fn default() -> Self {
        Self::new(Duration::hours(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_at(id: &str, path: PathBuf, created_at: DateTime<Utc>) -> Report {
        Report {
            id: id.to_string(),
            file_path: path,
            created_at,
        }
    }

    #[test]
    fn test_save_get_remove() {
        let store = ReportStore::default();
        store.save(Report::new("abc".to_string(), PathBuf::from("/tmp/abc.csv")));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("abc").unwrap().file_path, PathBuf::from("/tmp/abc.csv"));
        assert!(store.get("missing").is_none());

        assert!(store.remove("abc").is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn test_sweep_removes_expired_files_only() {
        let temp_dir = tempfile::tempdir().unwrap();
        let expired_file = temp_dir.path().join("expired.csv");
        let valid_file = temp_dir.path().join("valid.csv");
        std::fs::write(&expired_file, "id,name\n1,expired").unwrap();
        std::fs::write(&valid_file, "id,name\n2,valid").unwrap();

        let store = ReportStore::new(Duration::hours(1));
        let now = Utc::now();
        store.save(report_at("expired-id", expired_file.clone(), now - Duration::hours(2)));
        store.save(report_at("valid-id", valid_file.clone(), now));

        let removed = store.sweep_expired(now);

        assert_eq!(removed, vec!["expired-id".to_string()]);
        assert!(store.get("expired-id").is_none());
        assert!(!expired_file.exists());
        assert!(store.get("valid-id").is_some());
        assert!(valid_file.exists());
    }

    #[test]
    fn test_sweep_tolerates_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(Duration::minutes(5));
        let now = Utc::now();
        store.save(report_at(
            "gone",
            temp_dir.path().join("never-written.csv"),
            now - Duration::minutes(10),
        ));

        assert_eq!(store.sweep_expired(now), vec!["gone".to_string()]);
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_ttl_changes_expiry() {
        let store = ReportStore::new(Duration::hours(1));
        let now = Utc::now();
        store.save(report_at("r1", PathBuf::from("/nonexistent/r1.csv"), now - Duration::minutes(30)));

        assert!(store.sweep_expired(now).is_empty());

        store.set_ttl(Duration::minutes(10));
        assert_eq!(store.ttl(), Duration::minutes(10));
        assert_eq!(store.sweep_expired(now), vec!["r1".to_string()]);
    }
}
