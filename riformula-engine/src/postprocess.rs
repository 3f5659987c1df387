//! Output hygiene applied to every completion before it is cached or
//! served: trim, markdown stripping, capitalization, terminal punctuation
//! and sentence truncation.

/// Apply the full post-processing pass.
///
/// Order matters: markdown is stripped before capitalization so a leading
/// list marker does not shield the first letter, and truncation runs last
/// so the result always ends on a terminal mark.
pub fn tidy_output(raw: &str, max_sentences: usize) -> String {
    let stripped = strip_markdown(raw.trim());
    let polished = ensure_terminal_punctuation(&capitalize_first(&stripped));
    truncate_sentences(&polished, max_sentences)
}

/// Minimal formatting used when the upstream output is unusable: the
/// processed input echoed back with a capital letter and a final period.
pub fn format_fallback(input: &str) -> String {
    ensure_terminal_punctuation(&capitalize_first(input.trim()))
}

/// An output that must not be served as-is: empty, suspiciously short, or
/// carrying a serialized `undefined` from a broken upstream template.
pub fn is_unusable(output: &str) -> bool {
    let trimmed = output.trim();
    trimmed.is_empty() || trimmed.chars().count() < 5 || trimmed.contains("undefined")
}

/// Drop heading/list/quote markers at line starts and emphasis/backtick
/// characters everywhere, rejoining surviving lines with single spaces.
fn strip_markdown(text: &str) -> String {
    text.lines()
        .map(|line| {
            line.trim_start_matches(|c: char| {
                c == '#' || c == '-' || c == '*' || c == '>' || c.is_whitespace()
            })
            .replace(['*', '`'], "")
        })
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn ensure_terminal_punctuation(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    match text.chars().last() {
        Some('.') | Some('?') | Some('!') => text.to_string(),
        _ => format!("{}.", text),
    }
}

/// Cut after the Nth terminal punctuation mark.
fn truncate_sentences(text: &str, max_sentences: usize) -> String {
    if max_sentences == 0 {
        return text.to_string();
    }

    let mut seen = 0;
    for (idx, c) in text.char_indices() {
        if matches!(c, '.' | '?' | '!') {
            seen += 1;
            if seen == max_sentences {
                return text[..idx + c.len_utf8()].to_string();
            }
        }
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_and_capitalize_and_punctuate() {
        assert_eq!(
            tidy_output("  presidio tecnico presso zara  ", 2),
            "Presidio tecnico presso zara."
        );
    }

    #[test]
    fn test_existing_terminal_punctuation_kept() {
        assert_eq!(tidy_output("Intervento completato?", 2), "Intervento completato?");
        assert_eq!(tidy_output("Intervento completato!", 2), "Intervento completato!");
    }

    #[test]
    fn test_markdown_markers_stripped() {
        assert_eq!(
            tidy_output("- **Installazione** del server `SQL`", 2),
            "Installazione del server SQL."
        );
        assert_eq!(
            tidy_output("## Riformulazione\nConfigurazione completata.", 2),
            "Riformulazione Configurazione completata."
        );
    }

    #[test]
    fn test_sentence_truncation_at_limit() {
        let long = "Prima frase. Seconda frase. Terza frase. Quarta frase.";
        assert_eq!(tidy_output(long, 2), "Prima frase. Seconda frase.");
        assert_eq!(tidy_output(long, 1), "Prima frase.");
        assert_eq!(tidy_output(long, 4), long);
    }

    #[test]
    fn test_truncation_counts_all_terminal_marks() {
        let mixed = "Funziona? Sì! Terza frase.";
        assert_eq!(tidy_output(mixed, 2), "Funziona? Sì!");
    }

    #[test]
    fn test_truncation_no_op_below_limit() {
        assert_eq!(tidy_output("Una sola frase", 4), "Una sola frase.");
    }

    #[test]
    fn test_fallback_formatting() {
        assert_eq!(format_fallback("presidio zara"), "Presidio zara.");
        assert_eq!(format_fallback("già formattato."), "Già formattato.");
    }

    #[test]
    fn test_fallback_capitalizes_accented_initial() {
        assert_eq!(format_fallback("è stato fatto"), "È stato fatto.");
    }

    #[test]
    fn test_unusable_outputs() {
        assert!(is_unusable(""));
        assert!(is_unusable("   "));
        assert!(is_unusable("ok."));
        assert!(is_unusable("output undefined qui"));
        assert!(!is_unusable("Presidio tecnico presso Zara."));
    }
}
