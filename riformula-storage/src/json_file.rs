//! JSON-file-backed store implementations.
//!
//! Each store owns one JSON document on disk and persists write-through:
//! every mutation rewrites the full document to a temp file and renames it
//! into place, so a crash mid-write never leaves a corrupt file for the
//! next reader. Unreadable documents downgrade to empty defaults with a
//! logged error - persistence is best-effort for availability.

use chrono::Utc;
use riformula_core::{
    CorrectionStats, ExampleRecord, FeedbackPolarity, FeedbackStats, RiformulaResult,
    SimilarityThresholds, StoreError,
};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::documents::{CorrectionDocument, ExampleDocument, FeedbackDocument};
use crate::snapshot::write_backup;
use crate::{CorrectionStore, ExampleStore, FeedbackStore, SnapshotSource};

// ============================================================================
// DOCUMENT FILE
// ============================================================================

/// One JSON document under a RwLock, tied to its on-disk path.
#[derive(Debug)]
struct JsonDocumentFile<T> {
    path: PathBuf,
    inner: RwLock<T>,
}

impl<T: Serialize + DeserializeOwned + Default + Clone> JsonDocumentFile<T> {
    /// Open the document, tolerating a missing or unreadable file.
    fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if let Err(error) = std::fs::create_dir_all(parent) {
                tracing::warn!(path = %parent.display(), %error, "cannot create store directory");
            }
        }

        let document = match std::fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(document) => document,
                Err(error) => {
                    tracing::error!(path = %path.display(), %error, "corrupt store document, starting empty");
                    T::default()
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => T::default(),
            Err(error) => {
                tracing::error!(path = %path.display(), %error, "cannot read store document, starting empty");
                T::default()
            }
        };

        Self {
            path,
            inner: RwLock::new(document),
        }
    }

    fn read<R>(&self, f: impl FnOnce(&T) -> R) -> RiformulaResult<R> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(f(&inner))
    }

    /// Mutate the document and persist it write-through.
    fn update(&self, f: impl FnOnce(&mut T)) -> RiformulaResult<()> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        f(&mut inner);
        self.persist(&inner)
    }

    /// Full-document rewrite via temp-then-rename.
    fn persist(&self, document: &T) -> RiformulaResult<()> {
        let json = serde_json::to_string_pretty(document).map_err(|e| StoreError::Io {
            path: self.path.display().to_string(),
            reason: format!("serialize: {}", e),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| StoreError::Io {
            path: tmp.display().to_string(),
            reason: e.to_string(),
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| StoreError::Io {
            path: self.path.display().to_string(),
            reason: format!("rename: {}", e),
        })?;

        Ok(())
    }

    /// Clone the document without blocking writers for longer than a read.
    fn clone_document(&self) -> RiformulaResult<T> {
        self.read(|document| document.clone())
    }
}

// ============================================================================
// EXAMPLE STORE
// ============================================================================

#[derive(Debug)]
pub struct JsonExampleStore {
    file: JsonDocumentFile<ExampleDocument>,
}

impl JsonExampleStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonDocumentFile::open(path),
        }
    }
}

impl SnapshotSource for JsonExampleStore {
    fn store_name(&self) -> &str {
        "examples"
    }

    fn snapshot(&self, backup_dir: &Path) -> RiformulaResult<PathBuf> {
        let document = self.file.clone_document()?;
        write_backup(backup_dir, self.store_name(), &document)
    }
}

impl ExampleStore for JsonExampleStore {
    fn find_exact(&self, input: &str) -> RiformulaResult<Option<ExampleRecord>> {
        self.file.read(|doc| doc.find_exact(input).cloned())
    }

    fn find_similar(
        &self,
        input: &str,
        threshold: f64,
    ) -> RiformulaResult<Option<ExampleRecord>> {
        self.file.read(|doc| doc.find_similar(input, threshold).cloned())
    }

    fn upsert(&self, input: &str, output: &str) -> RiformulaResult<()> {
        self.file.update(|doc| doc.upsert(input, output, Utc::now()))
    }

    fn recompute_quality_scores(&self) -> RiformulaResult<()> {
        self.file.update(|doc| doc.recompute_quality_scores(Utc::now()))
    }

    fn len(&self) -> usize {
        self.file.read(|doc| doc.len()).unwrap_or(0)
    }
}

// ============================================================================
// FEEDBACK STORE
// ============================================================================

#[derive(Debug)]
pub struct JsonFeedbackStore {
    file: JsonDocumentFile<FeedbackDocument>,
    thresholds: SimilarityThresholds,
}

impl JsonFeedbackStore {
    pub fn open(path: impl Into<PathBuf>, thresholds: SimilarityThresholds) -> Self {
        Self {
            file: JsonDocumentFile::open(path),
            thresholds,
        }
    }
}

impl SnapshotSource for JsonFeedbackStore {
    fn store_name(&self) -> &str {
        "feedback"
    }

    fn snapshot(&self, backup_dir: &Path) -> RiformulaResult<PathBuf> {
        let document = self.file.clone_document()?;
        write_backup(backup_dir, self.store_name(), &document)
    }
}

impl FeedbackStore for JsonFeedbackStore {
    fn is_known_negative(&self, input: &str, candidate_output: &str) -> RiformulaResult<bool> {
        self.file
            .read(|doc| doc.is_known_negative(input, candidate_output, &self.thresholds))
    }

    fn find_positive_replacement(&self, input: &str) -> RiformulaResult<Option<String>> {
        self.file
            .read(|doc| doc.find_positive_replacement(input, &self.thresholds))
    }

    fn record_feedback(
        &self,
        original: &str,
        enhanced: &str,
        polarity: FeedbackPolarity,
    ) -> RiformulaResult<()> {
        self.file.update(|doc| {
            doc.record_feedback(original, enhanced, polarity, &self.thresholds, Utc::now())
        })
    }

    fn stats(&self) -> RiformulaResult<FeedbackStats> {
        self.file.read(|doc| doc.statistics.clone())
    }
}

// ============================================================================
// CORRECTION STORE
// ============================================================================

#[derive(Debug)]
pub struct JsonCorrectionStore {
    file: JsonDocumentFile<CorrectionDocument>,
    thresholds: SimilarityThresholds,
}

impl JsonCorrectionStore {
    pub fn open(path: impl Into<PathBuf>, thresholds: SimilarityThresholds) -> Self {
        Self {
            file: JsonDocumentFile::open(path),
            thresholds,
        }
    }
}

impl SnapshotSource for JsonCorrectionStore {
    fn store_name(&self) -> &str {
        "corrections"
    }

    fn snapshot(&self, backup_dir: &Path) -> RiformulaResult<PathBuf> {
        let document = self.file.clone_document()?;
        write_backup(backup_dir, self.store_name(), &document)
    }
}

impl CorrectionStore for JsonCorrectionStore {
    fn record_correction(
        &self,
        original: &str,
        ai_generated: &str,
        user_corrected: &str,
    ) -> RiformulaResult<()> {
        self.file.update(|doc| {
            doc.record_correction(
                original,
                ai_generated,
                user_corrected,
                &self.thresholds,
                Utc::now(),
            )
        })
    }

    fn record_request(&self) -> RiformulaResult<()> {
        self.file.update(|doc| doc.record_request(Utc::now()))
    }

    fn stats(&self) -> RiformulaResult<CorrectionStats> {
        self.file.read(|doc| doc.statistics.clone())
    }
}
