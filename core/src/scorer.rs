//! Composite scorer
//!
//! Combines the five metric functions with fixed weights into one overall
//! score in `[0, 100]`. Weights and thresholds are an explicit configuration
//! validated once at construction.

use crate::error::ConfigError;
use crate::metrics::{self, KeywordDensityCurve};
use crate::score::{Metric, MetricScores, ScoredText};
use crate::types::{CorpusPool, KeywordSet};
use serde::{Deserialize, Serialize};

/// Tolerance for the weights-sum-to-one invariant
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Relative weight of each metric in the overall score
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricWeights {
    /// Keyword weight
    pub keyword: f64,
    /// Readability weight
    pub readability: f64,
    /// Length weight
    pub length: f64,
    /// Structure weight
    pub structure: f64,
    /// Uniqueness weight
    pub uniqueness: f64,
}

impl MetricWeights {
    /// Weight for one metric
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

    /// Sum of all weights
    #[must_use]
    pub fn sum(&self) -> f64 {
        Metric::ALL.iter().map(|m| self.get(*m)).sum()
    }

    /// Check every weight is finite and non-negative and that they sum to 1.0
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidWeight` or
    /// `ConfigError::WeightsDoNotSumToOne`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for metric in Metric::ALL {
            let value = self.get(metric);
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    metric: metric.name(),
                    value,
                });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightsDoNotSumToOne { sum });
        }
        Ok(())
    }
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self {
            keyword: 0.30,
            readability: 0.20,
            length: 0.15,
            structure: 0.20,
            uniqueness: 0.15,
        }
    }
}

/// Scorer configuration
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Metric weights (must sum to 1.0)
    pub weights: MetricWeights,
    /// Keyword density curve
    pub keyword_density: KeywordDensityCurve,
    /// Per-metric score (0 to 100) at which a candidate counts as saturated
    pub saturation_threshold: f64,
}

impl ScoringConfig {
    /// Validate the whole scoring configuration
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.keyword_density.validate()?;
        if !(0.0..=100.0).contains(&self.saturation_threshold) {
            return Err(ConfigError::InvalidSaturationThreshold(
                self.saturation_threshold,
            ));
        }
        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: MetricWeights::default(),
            keyword_density: KeywordDensityCurve::default(),
            saturation_threshold: 80.0,
        }
    }
}

/// Anything that turns text into a [`ScoredText`]
///
/// The runtime scores through this trait so tests can substitute scripted
/// score sequences.
pub trait TextScorer: Send + Sync {
    /// Score `text` for `keywords` against `corpus`
    fn score(&self, text: &str, keywords: &KeywordSet, corpus: &CorpusPool) -> ScoredText;
}

/// Production scorer built from a validated [`ScoringConfig`]
#[derive(Clone, Debug)]
pub struct CompositeScorer {
    config: ScoringConfig,
}

impl CompositeScorer {
    /// Create a scorer after validating `config`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is invalid.
    pub fn new(config: ScoringConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Scorer configuration
    #[must_use]
    pub const fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Raw metric values in `[0, 1]`
    #[must_use]
    pub fn raw_metrics(&self, text: &str, keywords: &KeywordSet, corpus: &CorpusPool) -> MetricScores {
        MetricScores {
            keyword: metrics::keyword_score(text, keywords, &self.config.keyword_density),
            readability: metrics::readability_score(text),
            length: metrics::length_score(text),
            structure: metrics::structure_score(text),
            uniqueness: metrics::uniqueness_score(text, corpus),
        }
    }

    /// Score a description
    ///
    /// `overall_score` is `100 * Σ weight * metric` and every metric is
    /// reported as `metric * 100`, all rounded to two decimals.
    #[must_use]
    pub fn score_description(
        &self,
        text: &str,
        keywords: &KeywordSet,
        corpus: &CorpusPool,
    ) -> ScoredText {
        let raw = self.raw_metrics(text, keywords, corpus);
        let weighted: f64 = raw
            .iter()
            .map(|(metric, value)| self.config.weights.get(metric) * value)
            .sum();

        let scored = ScoredText {
            text: text.to_string(),
            overall_score: round2(weighted * 100.0),
            metric_scores: MetricScores {
                keyword: round2(raw.keyword * 100.0),
                readability: round2(raw.readability * 100.0),
                length: round2(raw.length * 100.0),
                structure: round2(raw.structure * 100.0),
                uniqueness: round2(raw.uniqueness * 100.0),
            },
        };

        tracing::trace!(
            overall = scored.overall_score,
            weakest = %scored.weakest_metric(),
            "scored description"
        );
        scored
    }
}

impl Default for CompositeScorer {
    fn default() -> Self {
        Self {
            config: ScoringConfig::default(),
        }
    }
}

impl TextScorer for CompositeScorer {
    fn score(&self, text: &str, keywords: &KeywordSet, corpus: &CorpusPool) -> ScoredText {
        self.score_description(text, keywords, corpus)
    }
}

/// Round to two decimal places
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let weights = MetricWeights::default();
        assert!((weights.sum() - 1.0).abs() < 1e-12);
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn test_weights_not_summing_to_one_rejected() {
        let config = ScoringConfig {
            weights: MetricWeights {
                keyword: 0.5,
                ..MetricWeights::default()
            },
            ..ScoringConfig::default()
        };
        let err = CompositeScorer::new(config).unwrap_err();
        assert!(matches!(err, ConfigError::WeightsDoNotSumToOne { .. }));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let weights = MetricWeights {
            keyword: -0.1,
            readability: 0.6,
            ..MetricWeights::default()
        };
        assert!(matches!(
            weights.validate(),
            Err(ConfigError::InvalidWeight { metric: "keyword", .. })
        ));
    }

    #[test]
    fn test_saturation_threshold_range() {
        let config = ScoringConfig {
            saturation_threshold: 120.0,
            ..ScoringConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSaturationThreshold(_))
        ));
    }

    #[test]
    fn test_round2() {
        assert!((round2(70.304_999) - 70.3).abs() < 1e-9);
        assert!((round2(12.345_6) - 12.35).abs() < 1e-9);
    }

    #[test]
    fn test_overall_is_weighted_sum() {
        let scorer = CompositeScorer::default();
        // Empty text: keyword 0, readability 0.5, length 0.3, structure 0, uniqueness 1.0
        let scored = scorer.score_description("", &KeywordSet::empty(), &CorpusPool::new());
        assert!((scored.metric_scores.keyword - 0.0).abs() < 1e-9);
        assert!((scored.metric_scores.readability - 50.0).abs() < 1e-9);
        assert!((scored.metric_scores.length - 30.0).abs() < 1e-9);
        assert!((scored.metric_scores.structure - 0.0).abs() < 1e-9);
        assert!((scored.metric_scores.uniqueness - 100.0).abs() < 1e-9);
        // 0.2 * 0.5 + 0.15 * 0.3 + 0.15 * 1.0 = 0.295
        assert!((scored.overall_score - 29.5).abs() < 1e-9);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let scorer = CompositeScorer::default();
        let keywords = KeywordSet::new(["wireless mouse", "ergonomic design"]);
        let corpus = CorpusPool::from(vec!["A quiet wireless mouse for your desk.".to_string()]);
        let text = "Meet the wireless mouse.\n\nErgonomic design, silent clicks, and 2.4GHz range.";
        let a = scorer.score_description(text, &keywords, &corpus);
        let b = scorer.score_description(text, &keywords, &corpus);
        assert_eq!(a, b);
    }
}
