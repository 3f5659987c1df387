//! Store documents: the serialized shape shared by the in-memory and
//! JSON-file implementations, with all lookup/update logic in one place.

use chrono::{DateTime, Utc};
use riformula_core::{
    score, CorrectionRecord, CorrectionStats, ExampleRecord, FeedbackPolarity, FeedbackRecord,
    FeedbackStats, SimilarityThresholds,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// EXAMPLE DOCUMENT
// ============================================================================

/// The example store's full contents. Insertion order is preserved and is
/// load-bearing for similarity tie-breaking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExampleDocument {
    pub records: Vec<ExampleRecord>,
}

impl ExampleDocument {
    pub fn find_exact(&self, input: &str) -> Option<&ExampleRecord> {
        self.records.iter().find(|record| record.input == input)
    }

    /// Best record scoring strictly above `threshold`; first above wins
    /// ties because only strictly greater scores move the running best.
    pub fn find_similar(&self, input: &str, threshold: f64) -> Option<&ExampleRecord> {
        let mut best = None;
        let mut running_best = threshold;

        for record in &self.records {
            let similarity = score(input, &record.input);
            if similarity > running_best {
                running_best = similarity;
                best = Some(record);
            }
        }

        best
    }

    pub fn upsert(&mut self, input: &str, output: &str, now: DateTime<Utc>) {
        if let Some(record) = self.records.iter_mut().find(|r| r.input == input) {
            record.output = output.to_string();
            record.usage_count += 1;
            record.last_updated_at = now;
        } else {
            self.records.push(ExampleRecord::new(input, output, now));
        }
        self.recompute_quality_scores(now);
    }

    pub fn recompute_quality_scores(&mut self, now: DateTime<Utc>) {
        for record in &mut self.records {
            record.recompute_quality(now);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// FEEDBACK DOCUMENT
// ============================================================================

/// Positive and negative judgment collections plus their counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackDocument {
    pub positive: Vec<FeedbackRecord>,
    pub negative: Vec<FeedbackRecord>,
    pub statistics: FeedbackStats,
}

impl FeedbackDocument {
    /// Both the input and the candidate output must clear the feedback
    /// threshold against the same stored record.
    pub fn is_known_negative(
        &self,
        input: &str,
        candidate_output: &str,
        thresholds: &SimilarityThresholds,
    ) -> bool {
        self.negative.iter().any(|record| {
            score(input, &record.original) > thresholds.feedback_match
                && score(candidate_output, &record.enhanced) > thresholds.feedback_match
        })
    }

    pub fn find_positive_replacement(
        &self,
        input: &str,
        thresholds: &SimilarityThresholds,
    ) -> Option<String> {
        let input_lower = input.to_lowercase();

        self.positive
            .iter()
            .find(|record| {
                let original_lower = record.original.to_lowercase();
                let contained = original_lower.contains(&input_lower)
                    || input_lower.contains(&original_lower);
                contained && score(input, &record.original) > thresholds.feedback_match
            })
            .map(|record| record.enhanced.clone())
    }

    pub fn record_feedback(
        &mut self,
        original: &str,
        enhanced: &str,
        polarity: FeedbackPolarity,
        thresholds: &SimilarityThresholds,
        now: DateTime<Utc>,
    ) {
        let entry = FeedbackRecord {
            original: original.to_string(),
            enhanced: enhanced.to_string(),
            timestamp: now,
        };

        match polarity {
            FeedbackPolarity::Positive => {
                let existing = self
                    .positive
                    .iter_mut()
                    .find(|r| score(&r.original, original) > thresholds.near_duplicate);
                match existing {
                    Some(record) => *record = entry,
                    None => self.positive.push(entry),
                }
                self.statistics.total_positive += 1;
            }
            FeedbackPolarity::Negative => {
                // Negative near-dup detection also requires the enhanced
                // texts to match: the same input can accumulate several
                // distinct rejected outputs.
                let existing = self.negative.iter_mut().find(|r| {
                    score(&r.original, original) > thresholds.near_duplicate
                        && score(&r.enhanced, enhanced) > thresholds.negative_enhanced_dup
                });
                match existing {
                    Some(record) => *record = entry,
                    None => self.negative.push(entry),
                }
                self.statistics.total_negative += 1;
            }
        }

        self.statistics.last_updated = Some(now);
    }
}

// ============================================================================
// CORRECTION DOCUMENT
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrectionDocument {
    pub corrections: Vec<CorrectionRecord>,
    pub statistics: CorrectionStats,
}

impl CorrectionDocument {
    pub fn record_correction(
        &mut self,
        original: &str,
        ai_generated: &str,
        user_corrected: &str,
        thresholds: &SimilarityThresholds,
        now: DateTime<Utc>,
    ) {
        let entry = CorrectionRecord {
            original: original.to_string(),
            ai_generated: ai_generated.to_string(),
            user_corrected: user_corrected.to_string(),
            timestamp: now,
        };

        let existing = self
            .corrections
            .iter_mut()
            .find(|c| score(&c.original, original) > thresholds.near_duplicate);
        match existing {
            Some(record) => *record = entry,
            None => self.corrections.push(entry),
        }

        self.statistics.total_corrections += 1;
        self.statistics.last_updated = Some(now);
    }

    pub fn record_request(&mut self, now: DateTime<Utc>) {
        self.statistics.total_requests += 1;
        self.statistics.last_updated = Some(now);
    }
}
