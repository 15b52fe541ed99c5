//! Flesch reading-ease and Flesch-Kincaid grade
//!
//! Syllables are estimated with the usual vowel-group heuristic for English.

use crate::error::MetricComputationFailure;

/// Score returned when the formulas cannot run on the text
pub const NEUTRAL_READABILITY: f64 = 0.5;

/// Grade band that maps to a perfect grade sub-score
const IDEAL_GRADE_LOW: f64 = 7.0;
const IDEAL_GRADE_HIGH: f64 = 8.0;
/// Sub-score lost per grade outside the ideal band
const GRADE_DECAY_PER_LEVEL: f64 = 0.1;

/// Raw counts and formula outputs for a text
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReadabilityStats {
    /// Words counted
    pub words: usize,
    /// Sentences counted
    pub sentences: usize,
    /// Estimated syllables
    pub syllables: usize,
    /// Flesch reading ease (higher is easier, usually 0 to 100)
    pub reading_ease: f64,
    /// Flesch-Kincaid grade level
    pub grade_level: f64,
}

/// Compute reading statistics for `text`
///
/// # Errors
///
/// Returns `MetricComputationFailure` when the text has no words or no
/// sentences.
#[allow(clippy::cast_precision_loss)]
pub fn analyze(text: &str) -> Result<ReadabilityStats, MetricComputationFailure> {
    let words: Vec<&str> = text
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .collect();
    if words.is_empty() {
        return Err(MetricComputationFailure::NoWords);
    }

    let sentences = count_sentences(text);
    if sentences == 0 {
        return Err(MetricComputationFailure::NoSentences);
    }

    let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();

    let words_per_sentence = words.len() as f64 / sentences as f64;
    let syllables_per_word = syllables as f64 / words.len() as f64;

    Ok(ReadabilityStats {
        words: words.len(),
        sentences,
        syllables,
        reading_ease: 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word,
        grade_level: 0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59,
    })
}

/// Normalized readability in `[0, 1]`
///
/// Mean of the reading ease remapped from 0..100 and a grade sub-score that
/// is 1.0 for grades 7 to 8 and decays linearly outside that band.
/// Degenerate text yields [`NEUTRAL_READABILITY`].
#[must_use]
pub fn readability_score(text: &str) -> f64 {
    match analyze(text) {
        Ok(stats) => {
            let ease = (stats.reading_ease / 100.0).clamp(0.0, 1.0);
            let grade = grade_subscore(stats.grade_level);
            (ease + grade) / 2.0
        }
        Err(failure) => {
            tracing::debug!(%failure, "readability fell back to neutral default");
            NEUTRAL_READABILITY
        }
    }
}

fn grade_subscore(grade: f64) -> f64 {
    let distance = if grade < IDEAL_GRADE_LOW {
        IDEAL_GRADE_LOW - grade
    } else if grade > IDEAL_GRADE_HIGH {
        grade - IDEAL_GRADE_HIGH
    } else {
        0.0
    };
    (1.0 - distance * GRADE_DECAY_PER_LEVEL).clamp(0.0, 1.0)
}

/// Sentences are runs of text ending in `.`, `!` or `?` followed by
/// whitespace or end of input. Trailing text without a terminator counts as
/// one more sentence when it holds a word. Decimal points ("2.4GHz") do not
/// split sentences.
fn count_sentences(text: &str) -> usize {
    let mut sentences = 0;
    let mut has_word = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_alphanumeric() {
            has_word = true;
        } else if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().is_none_or(|next| next.is_whitespace());
            if at_boundary && has_word {
                sentences += 1;
                has_word = false;
            }
        }
    }

    if has_word {
        sentences += 1;
    }
    sentences
}

fn count_syllables(word: &str) -> usize {
    let letters: Vec<char> = word
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if letters.is_empty() {
        return 1;
    }

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut groups = 0;
    let mut previous_vowel = false;
    for &c in &letters {
        let vowel = is_vowel(c);
        if vowel && !previous_vowel {
            groups += 1;
        }
        previous_vowel = vowel;
    }

    // Silent trailing "e" ("mouse"), but not "-le" ("simple")
    let len = letters.len();
    if groups > 1 && letters[len - 1] == 'e' && !(len >= 2 && letters[len - 2] == 'l') {
        groups -= 1;
    }

    groups.max(1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;

    #[test]
    fn test_syllable_heuristic() {
        assert_eq!(count_syllables("mouse"), 1);
        assert_eq!(count_syllables("simple"), 2);
        assert_eq!(count_syllables("ergonomic"), 4);
        assert_eq!(count_syllables("the"), 1);
        assert_eq!(count_syllables("2024"), 1);
    }

    #[test]
    fn test_sentence_count_ignores_decimal_points() {
        assert_eq!(count_sentences("Runs at 2.4GHz. Quiet too!"), 2);
        assert_eq!(count_sentences("No terminator here"), 1);
        assert_eq!(count_sentences("..."), 0);
    }

    #[test]
    fn test_empty_text_falls_back_to_neutral() {
        assert!((readability_score("") - NEUTRAL_READABILITY).abs() < f64::EPSILON);
        assert!((readability_score("  ... !!") - NEUTRAL_READABILITY).abs() < f64::EPSILON);
    }

    #[test]
    fn test_analyze_reports_counts() {
        let stats = analyze("The cat sat. The dog ran.").unwrap();
        assert_eq!(stats.words, 6);
        assert_eq!(stats.sentences, 2);
        assert_eq!(stats.syllables, 6);
        // 206.835 - 1.015 * 3 - 84.6 * 1
        assert!((stats.reading_ease - 119.19).abs() < 0.01);
    }

    #[test]
    fn test_grade_band() {
        assert!((grade_subscore(7.5) - 1.0).abs() < f64::EPSILON);
        assert!((grade_subscore(10.0) - 0.8).abs() < 1e-9);
        assert!((grade_subscore(5.0) - 0.8).abs() < 1e-9);
        assert!(grade_subscore(30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_score_is_normalized() {
        let score = readability_score(
            "Extraordinarily sophisticated multifunctional instrumentation \
             characterizes unprecedented organizational interoperability.",
        );
        assert!((0.0..=1.0).contains(&score));
        let easy = readability_score("The cat sat. The dog ran. We had fun.");
        assert!(easy > score);
    }
}
