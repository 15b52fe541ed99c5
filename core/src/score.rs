//! Scored candidate values produced by the composite scorer

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five quality signals, in tie-break priority order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Keyword density around the target
    Keyword,
    /// Reading ease and grade level
    Readability,
    /// Word-count band
    Length,
    /// Paragraphs, lists, headings, punctuation
    Structure,
    /// Dissimilarity from the corpus pool
    Uniqueness,
}

impl Metric {
    /// All metrics in declaration (priority) order
    pub const ALL: [Self; 5] = [
        Self::Keyword,
        Self::Readability,
        Self::Length,
        Self::Structure,
        Self::Uniqueness,
    ];

    /// Stable lowercase name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Readability => "readability",
            Self::Length => "length",
            Self::Structure => "structure",
            Self::Uniqueness => "uniqueness",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-metric breakdown, each value in `[0, 100]`
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricScores {
    /// Keyword score
    pub keyword: f64,
    /// Readability score
    pub readability: f64,
    /// Length score
    pub length: f64,
    /// Structure score
    pub structure: f64,
    /// Uniqueness score
    pub uniqueness: f64,
}

impl MetricScores {
    /// Score for one metric
    #[must_use]
    pub const fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Keyword => self.keyword,
            Metric::Readability => self.readability,
            Metric::Length => self.length,
            Metric::Structure => self.structure,
            Metric::Uniqueness => self.uniqueness,
        }
    }

    /// `(metric, score)` pairs in priority order
    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        Metric::ALL.into_iter().map(|m| (m, self.get(m)))
    }

    /// Lowest-scoring metric; ties go to the earlier metric in [`Metric::ALL`]
    #[must_use]
    pub fn weakest(&self) -> Metric {
        let mut weakest = Metric::Keyword;
        let mut lowest = self.keyword;
        for (metric, score) in self.iter().skip(1) {
            if score < lowest {
                weakest = metric;
                lowest = score;
            }
        }
        weakest
    }

    /// Whether every metric is at or above `threshold`
    #[must_use]
    pub fn all_at_least(&self, threshold: f64) -> bool {
        self.iter().all(|(_, score)| score >= threshold)
    }
}

/// A candidate text together with its scores
///
/// Produced fresh every time text is scored and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredText {
    /// The candidate text
    pub text: String,
    /// Weighted overall score in `[0, 100]`
    pub overall_score: f64,
    /// Per-metric breakdown
    pub metric_scores: MetricScores,
}

impl ScoredText {
    /// Bundle a text with precomputed scores
    #[must_use]
    pub fn new(text: impl Into<String>, overall_score: f64, metric_scores: MetricScores) -> Self {
        Self {
            text: text.into(),
            overall_score,
            metric_scores,
        }
    }

    /// Metric the next rewrite should target
    #[must_use]
    pub fn weakest_metric(&self) -> Metric {
        self.metric_scores.weakest()
    }

    /// Whether every metric meets `threshold`
    #[must_use]
    pub fn is_saturated(&self, threshold: f64) -> bool {
        self.metric_scores.all_at_least(threshold)
    }
}
