use super::store::ReportStore;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;

/// Background task that sweeps expired reports on every tick.
///
/// The first tick fires immediately, so one sweep runs at startup.
/// A zero interval is raised to one millisecond.
pub async fn cleanup_task(store: Arc<ReportStore>, sweep_interval: Duration) {
    log::info!("⏰ Starting report cleanup worker (interval: {:?})", sweep_interval);

    let mut timer = interval(sweep_interval.max(Duration::from_millis(1)));

    loop {
        timer.tick().await;

        let removed = store.sweep_expired(Utc::now());
        if !removed.is_empty() {
            log::debug!("Swept {} expired reports, {} remaining", removed.len(), store.len());
        }
    }
}

/// Spawn [`cleanup_task`] on the current tokio runtime
pub fn spawn_cleanup_worker(store: Arc<ReportStore>, sweep_interval: Duration) -> JoinHandle<()> {
    tokio::spawn(cleanup_task(store, sweep_interval))
}
