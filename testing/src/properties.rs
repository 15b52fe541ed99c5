//! proptest strategies for copy refinement types

use copy_refinery_core::{KeywordSet, MetricScores, ScoredText};
use proptest::prelude::*;

const VOCABULARY: [&str; 16] = [
    "wireless", "mouse", "ergonomic", "design", "quiet", "click", "battery", "office", "desk",
    "precise", "the", "a", "and", "with", "for", "comfort",
];

/// A single vocabulary word
pub fn word() -> impl Strategy<Value = String> {
    prop::sample::select(VOCABULARY.to_vec()).prop_map(str::to_string)
}

/// Free text of up to `max_words` words with mixed punctuation and breaks
pub fn description(max_words: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(
        (word(), prop::sample::select(vec![" ", " ", " ", ", ", ". ", ".\n\n", ":\n- "])),
        0..=max_words,
    )
    .prop_map(|parts| parts.into_iter().map(|(w, sep)| format!("{w}{sep}")).collect())
}

/// A keyword set of up to five one- or two-word phrases
pub fn keyword_set() -> impl Strategy<Value = KeywordSet> {
    prop::collection::vec(
        prop::collection::vec(word(), 1..=2).prop_map(|words| words.join(" ")),
        0..=5,
    )
    .prop_map(KeywordSet::new)
}

/// Metric breakdown with every value in `[0, 100]`
pub fn metric_scores() -> impl Strategy<Value = MetricScores> {
    (0.0..=100.0, 0.0..=100.0, 0.0..=100.0, 0.0..=100.0, 0.0..=100.0).prop_map(
        |(keyword, readability, length, structure, uniqueness)| MetricScores {
            keyword,
            readability,
            length,
            structure,
            uniqueness,
        },
    )
}

/// Scored candidate with an overall score in `[0, 100]`
pub fn scored_text() -> impl Strategy<Value = ScoredText> {
    (description(40), 0.0..=100.0_f64, metric_scores())
        .prop_map(|(text, overall, metrics)| ScoredText::new(text, overall, metrics))
}
