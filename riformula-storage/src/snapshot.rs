//! Periodic store backups.
//!
//! Each registered store is copied to a timestamped file under the backup
//! directory, once immediately on startup and then on every interval tick.
//! Failures are logged and never propagate: losing a backup must not cost
//! a request.

use chrono::{DateTime, Utc};
use riformula_core::{RiformulaResult, StoreError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::SnapshotSource;

/// Backup file name for a store as of `now`. Colons and dots are not
/// filesystem-safe everywhere, so the timestamp is dashed.
pub fn backup_file_name(store_name: &str, now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("backup-{}-{}.json", store_name, stamp)
}

/// Serialize `document` into a fresh backup file under `backup_dir`,
/// creating the directory if needed.
pub fn write_backup<T: Serialize>(
    backup_dir: &Path,
    store_name: &str,
    document: &T,
) -> RiformulaResult<PathBuf> {
    std::fs::create_dir_all(backup_dir).map_err(|e| StoreError::SnapshotFailed {
        reason: format!("create {}: {}", backup_dir.display(), e),
    })?;

    let path = backup_dir.join(backup_file_name(store_name, Utc::now()));
    let json = serde_json::to_string_pretty(document).map_err(|e| StoreError::SnapshotFailed {
        reason: format!("serialize {}: {}", store_name, e),
    })?;
    std::fs::write(&path, json).map_err(|e| StoreError::SnapshotFailed {
        reason: format!("write {}: {}", path.display(), e),
    })?;

    Ok(path)
}

/// Runs store snapshots on an independent timer, concurrent with request
/// handling.
pub struct SnapshotScheduler {
    sources: Vec<Arc<dyn SnapshotSource>>,
    backup_dir: PathBuf,
    interval: Duration,
}

impl SnapshotScheduler {
    pub fn new(backup_dir: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            sources: Vec::new(),
            backup_dir: backup_dir.into(),
            interval,
        }
    }

    /// Hourly schedule, matching the production default.
    pub fn hourly(backup_dir: impl Into<PathBuf>) -> Self {
        Self::new(backup_dir, Duration::from_secs(3600))
    }

    pub fn register(mut self, source: Arc<dyn SnapshotSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Snapshot every registered store once, logging outcomes.
    pub fn snapshot_all(&self) {
        for source in &self.sources {
            match source.snapshot(&self.backup_dir) {
                Ok(path) => {
                    tracing::info!(store = source.store_name(), path = %path.display(), "store backup written");
                }
                Err(error) => {
                    tracing::warn!(store = source.store_name(), %error, "store backup failed");
                }
            }
        }
    }

    /// Spawn the periodic loop. The first tick fires immediately, covering
    /// the startup snapshot.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;
                self.snapshot_all();
            }
        })
    }
}

impl std::fmt::Debug for SnapshotScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotScheduler")
            .field("backup_dir", &self.backup_dir)
            .field("interval", &self.interval)
            .field("sources", &self.sources.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryExampleStore;
    use crate::ExampleStore;

    #[test]
    fn test_backup_file_name_is_filesystem_safe() {
        let name = backup_file_name("examples", Utc::now());
        assert!(name.starts_with("backup-examples-"));
        assert!(name.ends_with(".json"));
        assert!(!name.contains(':'));
    }

    #[test]
    fn test_backup_names_distinct_per_store() {
        let now = Utc::now();
        assert_ne!(
            backup_file_name("examples", now),
            backup_file_name("feedback", now)
        );
    }

    #[test]
    fn test_snapshot_all_tolerates_failures() {
        // Registering a store pointed at an unwritable backup dir must not
        // panic or abort the pass.
        let store = Arc::new(InMemoryExampleStore::new());
        store.upsert("input", "Output.").unwrap();

        let scheduler = SnapshotScheduler::new("/proc/riformula-nonexistent", Duration::from_secs(3600))
            .register(store);
        scheduler.snapshot_all();
    }

    #[tokio::test]
    async fn test_spawned_scheduler_writes_startup_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryExampleStore::new());
        store.upsert("presidio zara", "Presidio tecnico.").unwrap();

        let handle = SnapshotScheduler::new(dir.path(), Duration::from_secs(3600))
            .register(store)
            .spawn();

        // First interval tick fires immediately.
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        let backups: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(backups.len(), 1);
    }
}
