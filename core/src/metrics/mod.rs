//! The five metric functions
//!
//! Each function maps text (plus the auxiliary data it needs) to a score in
//! `[0, 1]`. They are pure and independent: a failure inside one never
//! affects the others.

mod readability;
mod text;

pub use readability::{NEUTRAL_READABILITY, ReadabilityStats, analyze, readability_score};

use crate::error::ConfigError;
use crate::types::{CorpusPool, KeywordSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Maps keyword density (percent) to a score
///
/// The score peaks at `target_density` and falls linearly to zero
/// `decay_width` points away on either side.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeywordDensityCurve {
    /// Ideal density in percent
    pub target_density: f64,
    /// Distance in percentage points at which the score reaches zero
    pub decay_width: f64,
}

impl KeywordDensityCurve {
    /// Validate the curve parameters
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidDensityCurve` for a negative or
    /// non-finite target, or a decay width that is not strictly positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.target_density.is_finite() || self.target_density < 0.0 {
            return Err(ConfigError::InvalidDensityCurve(format!(
                "target_density must be a finite value >= 0 (got {})",
                self.target_density
            )));
        }
        if !self.decay_width.is_finite() || self.decay_width <= 0.0 {
            return Err(ConfigError::InvalidDensityCurve(format!(
                "decay_width must be a finite value > 0 (got {})",
                self.decay_width
            )));
        }
        Ok(())
    }

    /// Score for a density in percent
    #[must_use]
    pub fn score(&self, density: f64) -> f64 {
        (1.0 - (density - self.target_density).abs() / self.decay_width).clamp(0.0, 1.0)
    }
}

impl Default for KeywordDensityCurve {
    fn default() -> Self {
        Self {
            target_density: 2.0,
            decay_width: 2.0,
        }
    }
}

/// Keyword density percentage of `text` for `keywords`
///
/// Occurrences of every keyword phrase, divided by the number of words.
/// Phrases are matched as substrings of the cleaned text, so a keyword also
/// counts inside a longer word.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn keyword_density(text: &str, keywords: &KeywordSet) -> f64 {
    let tokens = text::clean_tokens(text);
    if tokens.is_empty() {
        return 0.0;
    }
    let haystack = tokens.join(" ");

    let occurrences: usize = keywords
        .iter()
        .map(text::normalized)
        .map(|phrase| text::count_phrase(&haystack, &phrase))
        .sum();

    occurrences as f64 / tokens.len() as f64 * 100.0
}

/// Keyword usage score
///
/// Zero whenever `keywords` is empty: keyword presence is mandatory.
#[must_use]
pub fn keyword_score(text: &str, keywords: &KeywordSet, curve: &KeywordDensityCurve) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    if text::clean_tokens(text).is_empty() {
        return 0.0;
    }
    curve.score(keyword_density(text, keywords))
}

/// Length score: a step function of the whitespace word count
///
/// | words | score |
/// |-------|-------|
/// | < 50 | 0.3 |
/// | 50..=99 | 0.8 |
/// | 100..=150 | 1.0 |
/// | 151..=200 | 0.8 |
/// | > 200 | 0.7 |
#[must_use]
pub fn length_score(text: &str) -> f64 {
    match text::word_count(text) {
        100..=150 => 1.0,
        0..50 => 0.3,
        201.. => 0.7,
        _ => 0.8,
    }
}

const PARAGRAPH_CREDIT: f64 = 0.3;
const LIST_CREDIT: f64 = 0.2;
const HEADING_CREDIT: f64 = 0.2;
const PUNCTUATION_CREDIT: f64 = 0.3;
const LIST_MARKERS: [char; 3] = ['•', '-', '*'];

/// Structure score: additive credits, capped at 1.0
///
/// - 0.3 for at least two paragraphs separated by a blank line
/// - 0.2 for any list marker character (`•`, `-`, `*`)
/// - 0.2 for any line ending with `:`
/// - 0.3 for at least three periods and two commas
#[must_use]
pub fn structure_score(text: &str) -> f64 {
    let mut score = 0.0;

    if paragraph_count(text) >= 2 {
        score += PARAGRAPH_CREDIT;
    }
    if text.contains(LIST_MARKERS) {
        score += LIST_CREDIT;
    }
    if text.lines().any(|line| line.trim().ends_with(':')) {
        score += HEADING_CREDIT;
    }
    if text.matches('.').count() >= 3 && text.matches(',').count() >= 2 {
        score += PUNCTUATION_CREDIT;
    }

    f64::min(score, 1.0)
}

/// Non-empty blocks separated by blank (whitespace-only) lines
fn paragraph_count(text: &str) -> usize {
    let mut paragraphs = 0;
    let mut in_paragraph = false;
    for line in text.lines() {
        if line.trim().is_empty() {
            in_paragraph = false;
        } else if !in_paragraph {
            paragraphs += 1;
            in_paragraph = true;
        }
    }
    paragraphs
}

/// Uniqueness score against the corpus pool
///
/// For every pool entry other than an exact copy of `text`, similarity is
/// the size of the shared word set over the size of the larger set. The
/// score is one minus the mean similarity. With nothing to compare against
/// the text counts as fully unique.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn uniqueness_score(text: &str, corpus: &CorpusPool) -> f64 {
    let words = word_set(text);
    let mut total = 0.0;
    let mut comparisons = 0_usize;

    for other in corpus.as_slice().iter().filter(|other| other.as_str() != text) {
        let other_words = word_set(other);
        let larger = words.len().max(other_words.len());
        let similarity = if larger == 0 {
            0.0
        } else {
            words.intersection(&other_words).count() as f64 / larger as f64
        };
        total += similarity;
        comparisons += 1;
    }

    if comparisons == 0 {
        return 1.0;
    }
    (1.0 - total / comparisons as f64).max(0.0)
}

fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}
