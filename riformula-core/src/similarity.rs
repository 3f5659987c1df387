//! Lexical overlap scoring between activity descriptions.
//!
//! The scorer is the shared primitive behind example reuse, feedback
//! matching and near-duplicate detection. Every stored threshold in the
//! system (0.6, 0.7, 0.8, 0.9) was tuned against this exact formula.

use std::collections::HashSet;

/// Tokens of this many characters or fewer are discarded before scoring.
/// Filters Italian articles, prepositions and other connective noise.
const MIN_TOKEN_CHARS: usize = 3;

/// Lowercase, split on whitespace and keep only tokens longer than
/// [`MIN_TOKEN_CHARS`] characters.
pub fn token_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

/// Word-overlap similarity in `[0, 1]`.
///
/// Counts tokens of the first set that also appear in the second and
/// divides by `max(|A|, |B|)`. The max-based denominator is NOT a Jaccard
/// index and must not be replaced with one: the reuse thresholds stored
/// throughout the system assume this formula.
///
/// Returns `0.0` when either filtered set is empty - never NaN or infinite.
pub fn score(a: &str, b: &str) -> f64 {
    let words_a = token_set(a);
    let words_b = token_set(b);

    let larger = words_a.len().max(words_b.len());
    if larger == 0 {
        return 0.0;
    }

    let common = words_a.iter().filter(|w| words_b.contains(*w)).count();
    common as f64 / larger as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings_score_one() {
        assert_eq!(score("installazione server", "installazione server"), 1.0);
    }

    #[test]
    fn test_identity_is_zero_when_all_tokens_short() {
        // Every token has <= 3 chars, so both filtered sets are empty.
        assert_eq!(score("pc ok su", "pc ok su"), 0.0);
    }

    #[test]
    fn test_empty_inputs_guard_division() {
        assert_eq!(score("", ""), 0.0);
        assert_eq!(score("", "installazione"), 0.0);
        assert_eq!(score("installazione", ""), 0.0);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(score("PRESIDIO Zara", "presidio zara"), 1.0);
    }

    #[test]
    fn test_max_denominator_is_symmetric_despite_unequal_sizes() {
        // |A| = 2, |B| = 1: both directions divide by max = 2, so the
        // non-standard denominator still yields a symmetric score.
        let forward = score("installazione server", "server");
        let backward = score("server", "installazione server");
        assert_eq!(forward, 0.5);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_partial_overlap() {
        // {configurazione, firewall, aziendale} vs {configurazione, firewall,
        // rete}: 2 common over max size 3.
        let s = score(
            "configurazione firewall aziendale",
            "configurazione firewall rete",
        );
        assert!((s - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_tokens_do_not_count_as_overlap() {
        // "su" and "del" are filtered from both sides.
        let s = score("backup su nas del cliente", "backup del server");
        let expected = 1.0 / 2.0; // {backup, cliente} vs {backup, server}
        assert!((s - expected).abs() < 1e-9);
    }

    #[test]
    fn test_token_set_filters_and_lowercases() {
        let set = token_set("Aggiornamento SO su PC");
        assert!(set.contains("aggiornamento"));
        assert!(!set.contains("so"));
        assert!(!set.contains("pc"));
        assert_eq!(set.len(), 1);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// The score is always a finite value in [0, 1].
        #[test]
        fn prop_score_in_unit_range(a in ".{0,80}", b in ".{0,80}") {
            let s = score(&a, &b);
            prop_assert!(s.is_finite());
            prop_assert!((0.0..=1.0).contains(&s));
        }

        /// The max-based denominator makes the score symmetric even when
        /// the two token sets differ in size.
        #[test]
        fn prop_score_symmetric(a in "[a-zàèù ]{0,60}", b in "[a-zàèù ]{0,60}") {
            prop_assert_eq!(score(&a, &b), score(&b, &a));
        }

        /// Self-similarity is exactly 1 when any token survives the length
        /// filter, else exactly 0.
        #[test]
        fn prop_self_score_is_binary(a in "[a-zàèù ]{0,60}") {
            let s = score(&a, &a);
            if token_set(&a).is_empty() {
                prop_assert_eq!(s, 0.0);
            } else {
                prop_assert_eq!(s, 1.0);
            }
        }
    }
}
