//! Input preprocessing: typo correction, abbreviation expansion, activity
//! tagging and the advisory semantic check.
//!
//! Normalization is deterministic and purely lexical. The semantic validity
//! flag exists to feed UI hints; whether it hard-rejects a request is a
//! policy decision owned by the caller (see `ValidationPolicy`).

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Activity label used when no known activity prefix matches.
pub const GENERIC_ACTIVITY: &str = "attività generica";

/// Whole-token typo corrections, matched case-insensitively.
const TYPO_CORRECTIONS: &[(&str, &str)] = &[
    ("pc", "computer"),
    ("nottebook", "notebook"),
    ("config", "configurazione"),
    ("sw", "software"),
    ("hw", "hardware"),
    ("ripristin", "ripristino"),
    ("aggiorn", "aggiornamento"),
];

/// Substring abbreviation expansions, matched case-insensitively.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("s.o.", "sistema operativo"),
    ("ram", "RAM"),
    ("ssd", "SSD"),
    ("cpu", "CPU"),
    ("gpu", "GPU"),
    ("os", "sistema operativo"),
];

/// Activity-prefix substrings and their canonical labels, checked in order;
/// the first match wins.
const ACTIVITY_PREFIXES: &[(&str, &str)] = &[
    ("installaz", "installazione"),
    ("riparaz", "riparazione"),
    ("manutenz", "manutenzione"),
    ("configur", "configurazione"),
    ("collaud", "test"),
];

static ABBREVIATION_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = ABBREVIATIONS
        .iter()
        .map(|(abbr, _)| regex::escape(abbr))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .expect("abbreviation table forms a valid pattern")
});

// Past-participle action verbs plus technical-activity nouns; either family
// marks the input as semantically complete.
static ACTION_RE: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(
        r"\b(installato|riparato|configurato|testato|sostituito|installazione|riparazione|configurazione|manutenzione|aggiornamento|ripristino|presidio|supporto|backup)\b",
    )
    .case_insensitive(true)
    .build()
    .expect("action pattern is valid")
});

/// Result of preprocessing a raw activity description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NormalizedInput {
    /// The typo-corrected, abbreviation-expanded text.
    pub processed_input: String,
    /// Canonical activity label, or [`GENERIC_ACTIVITY`].
    pub activity_type: String,
    /// Advisory flag: the text names an action verb or technical activity.
    pub is_valid: bool,
    /// Hints for the caller when `is_valid` is false.
    pub suggestions: Vec<String>,
}

/// Preprocess a raw input string.
///
/// Steps, in order: whole-token typo correction, substring abbreviation
/// expansion, activity-type detection, semantic validity check. Fails only
/// on empty (or whitespace-only) input; validity never rejects here.
pub fn normalize(raw: &str) -> Result<NormalizedInput, InputError> {
    if raw.trim().is_empty() {
        return Err(InputError::Empty);
    }

    let corrected = correct_typos(raw);
    let processed = expand_abbreviations(&corrected);
    let activity_type = detect_activity_type(&processed);
    let is_valid = has_action_language(&processed);

    let suggestions = if is_valid {
        Vec::new()
    } else {
        vec!["Aggiungi verbi d'azione (es: installato, configurato)".to_string()]
    };

    Ok(NormalizedInput {
        processed_input: processed,
        activity_type,
        is_valid,
        suggestions,
    })
}

/// Replace whole tokens found in the typo table, rejoining with single
/// spaces.
fn correct_typos(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            TYPO_CORRECTIONS
                .iter()
                .find(|(typo, _)| *typo == lower)
                .map(|(_, fix)| *fix)
                .unwrap_or(word)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Expand abbreviations anywhere in the text, case-insensitively.
fn expand_abbreviations(input: &str) -> String {
    ABBREVIATION_RE
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let found = caps[0].to_lowercase();
            ABBREVIATIONS
                .iter()
                .find(|(abbr, _)| *abbr == found)
                .map(|(_, expansion)| (*expansion).to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// First matching activity-prefix substring wins.
fn detect_activity_type(input: &str) -> String {
    let lower = input.to_lowercase();
    ACTIVITY_PREFIXES
        .iter()
        .find(|(prefix, _)| lower.contains(prefix))
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| GENERIC_ACTIVITY.to_string())
}

fn has_action_language(input: &str) -> bool {
    ACTION_RE.is_match(input)
}
