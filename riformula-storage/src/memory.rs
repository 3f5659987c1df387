//! In-memory store implementations.
//!
//! Used by tests and as the degraded fallback when the file-backed stores
//! cannot be opened. Thread-safe via RwLock; same document logic as the
//! JSON implementations.

use chrono::Utc;
use riformula_core::{
    CorrectionStats, ExampleRecord, FeedbackPolarity, FeedbackStats, RiformulaResult,
    SimilarityThresholds, StoreError,
};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::documents::{CorrectionDocument, ExampleDocument, FeedbackDocument};
use crate::snapshot::write_backup;
use crate::{CorrectionStore, ExampleStore, FeedbackStore, SnapshotSource};

// ============================================================================
// EXAMPLE STORE
// ============================================================================

#[derive(Debug, Default)]
pub struct InMemoryExampleStore {
    inner: RwLock<ExampleDocument>,
}

impl InMemoryExampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: ExampleDocument) -> Self {
        Self {
            inner: RwLock::new(document),
        }
    }
}

impl SnapshotSource for InMemoryExampleStore {
    fn store_name(&self) -> &str {
        "examples"
    }

    fn snapshot(&self, backup_dir: &Path) -> RiformulaResult<PathBuf> {
        let document = self
            .inner
            .read()
            .map_err(|_| StoreError::LockPoisoned)?
            .clone();
        write_backup(backup_dir, self.store_name(), &document)
    }
}

impl ExampleStore for InMemoryExampleStore {
    fn find_exact(&self, input: &str) -> RiformulaResult<Option<ExampleRecord>> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.find_exact(input).cloned())
    }

    fn find_similar(
        &self,
        input: &str,
        threshold: f64,
    ) -> RiformulaResult<Option<ExampleRecord>> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.find_similar(input, threshold).cloned())
    }

    fn upsert(&self, input: &str, output: &str) -> RiformulaResult<()> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        inner.upsert(input, output, Utc::now());
        Ok(())
    }

    fn recompute_quality_scores(&self) -> RiformulaResult<()> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        inner.recompute_quality_scores(Utc::now());
        Ok(())
    }

    fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or(0)
    }
}

// ============================================================================
// FEEDBACK STORE
// ============================================================================

#[derive(Debug)]
pub struct InMemoryFeedbackStore {
    inner: RwLock<FeedbackDocument>,
    thresholds: SimilarityThresholds,
}

impl InMemoryFeedbackStore {
    pub fn new(thresholds: SimilarityThresholds) -> Self {
        Self {
            inner: RwLock::new(FeedbackDocument::default()),
            thresholds,
        }
    }
}

impl Default for InMemoryFeedbackStore {
    fn default() -> Self {
        Self::new(SimilarityThresholds::default())
    }
}

impl SnapshotSource for InMemoryFeedbackStore {
    fn store_name(&self) -> &str {
        "feedback"
    }

    fn snapshot(&self, backup_dir: &Path) -> RiformulaResult<PathBuf> {
        let document = self
            .inner
            .read()
            .map_err(|_| StoreError::LockPoisoned)?
            .clone();
        write_backup(backup_dir, self.store_name(), &document)
    }
}

impl FeedbackStore for InMemoryFeedbackStore {
    fn is_known_negative(&self, input: &str, candidate_output: &str) -> RiformulaResult<bool> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.is_known_negative(input, candidate_output, &self.thresholds))
    }

    fn find_positive_replacement(&self, input: &str) -> RiformulaResult<Option<String>> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.find_positive_replacement(input, &self.thresholds))
    }

    fn record_feedback(
        &self,
        original: &str,
        enhanced: &str,
        polarity: FeedbackPolarity,
    ) -> RiformulaResult<()> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        inner.record_feedback(original, enhanced, polarity, &self.thresholds, Utc::now());
        Ok(())
    }

    fn stats(&self) -> RiformulaResult<FeedbackStats> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.statistics.clone())
    }
}

// ============================================================================
// CORRECTION STORE
// ============================================================================

#[derive(Debug)]
pub struct InMemoryCorrectionStore {
    inner: RwLock<CorrectionDocument>,
    thresholds: SimilarityThresholds,
}

impl InMemoryCorrectionStore {
    pub fn new(thresholds: SimilarityThresholds) -> Self {
        Self {
            inner: RwLock::new(CorrectionDocument::default()),
            thresholds,
        }
    }
}

impl Default for InMemoryCorrectionStore {
    fn default() -> Self {
        Self::new(SimilarityThresholds::default())
    }
}

impl SnapshotSource for InMemoryCorrectionStore {
    fn store_name(&self) -> &str {
        "corrections"
    }

    fn snapshot(&self, backup_dir: &Path) -> RiformulaResult<PathBuf> {
        let document = self
            .inner
            .read()
            .map_err(|_| StoreError::LockPoisoned)?
            .clone();
        write_backup(backup_dir, self.store_name(), &document)
    }
}

impl CorrectionStore for InMemoryCorrectionStore {
    fn record_correction(
        &self,
        original: &str,
        ai_generated: &str,
        user_corrected: &str,
    ) -> RiformulaResult<()> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        inner.record_correction(
            original,
            ai_generated,
            user_corrected,
            &self.thresholds,
            Utc::now(),
        );
        Ok(())
    }

    fn record_request(&self) -> RiformulaResult<()> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        inner.record_request(Utc::now());
        Ok(())
    }

    fn stats(&self) -> RiformulaResult<CorrectionStats> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.statistics.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_store_roundtrip() {
        let store = InMemoryExampleStore::new();
        store.upsert("presidio zara", "Presidio tecnico.").unwrap();

        let record = store.find_exact("presidio zara").unwrap().unwrap();
        assert_eq!(record.output, "Presidio tecnico.");
        assert_eq!(store.len(), 1);

        store.upsert("presidio zara", "Presidio aggiornato.").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.find_exact("presidio zara").unwrap().unwrap().usage_count,
            2
        );
    }

    #[test]
    fn test_feedback_store_roundtrip() {
        let store = InMemoryFeedbackStore::default();
        store
            .record_feedback("test input", "Test Output.", FeedbackPolarity::Negative)
            .unwrap();

        assert!(store.is_known_negative("test input", "Test Output.").unwrap());
        assert_eq!(store.stats().unwrap().total_negative, 1);
    }

    #[test]
    fn test_correction_store_counters() {
        let store = InMemoryCorrectionStore::default();
        store.record_request().unwrap();
        store
            .record_correction("originale attivita", "Versione AI.", "Versione utente.")
            .unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.total_corrections, 1);
    }

    #[test]
    fn test_snapshot_writes_backup_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = InMemoryExampleStore::new();
        store.upsert("presidio zara", "Presidio tecnico.").unwrap();

        let path = store.snapshot(dir.path()).unwrap();
        assert!(path.exists());
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("presidio zara"));
    }
}
