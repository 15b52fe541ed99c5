//! A/B decision between two initial candidates

use crate::score::{MetricScores, ScoredText};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the two candidates was chosen
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// First candidate
    A,
    /// Second candidate
    B,
}

impl Variant {
    /// Label used in logs and metrics
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Audit record of an A/B selection
///
/// Serializes flat as `text_a`, `score_a`, `text_b`, `score_b` and
/// `selected_variant`, plus the per-metric breakdown of each side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "AbAudit", from = "AbAudit")]
pub struct AbSelection {
    /// First candidate
    pub variant_a: ScoredText,
    /// Second candidate
    pub variant_b: ScoredText,
    /// The winner
    pub selected: Variant,
}

impl AbSelection {
    /// Pick the candidate with the higher overall score; an exact tie goes to A
    #[must_use]
    pub fn decide(variant_a: ScoredText, variant_b: ScoredText) -> Self {
        let selected = if variant_b.overall_score > variant_a.overall_score {
            Variant::B
        } else {
            Variant::A
        };
        Self {
            variant_a,
            variant_b,
            selected,
        }
    }

    /// The winning candidate
    #[must_use]
    pub const fn winner(&self) -> &ScoredText {
        match self.selected {
            Variant::A => &self.variant_a,
            Variant::B => &self.variant_b,
        }
    }

    /// Consume the record, keeping only the winner
    #[must_use]
    pub fn into_winner(self) -> ScoredText {
        match self.selected {
            Variant::A => self.variant_a,
            Variant::B => self.variant_b,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct AbAudit {
    text_a: String,
    score_a: f64,
    scores_a: MetricScores,
    text_b: String,
    score_b: f64,
    scores_b: MetricScores,
    selected_variant: Variant,
}

impl From<AbSelection> for AbAudit {
    fn from(selection: AbSelection) -> Self {
        Self {
            text_a: selection.variant_a.text,
            score_a: selection.variant_a.overall_score,
            scores_a: selection.variant_a.metric_scores,
            text_b: selection.variant_b.text,
            score_b: selection.variant_b.overall_score,
            scores_b: selection.variant_b.metric_scores,
            selected_variant: selection.selected,
        }
    }
}

impl From<AbAudit> for AbSelection {
    fn from(audit: AbAudit) -> Self {
        Self {
            variant_a: ScoredText::new(audit.text_a, audit.score_a, audit.scores_a),
            variant_b: ScoredText::new(audit.text_b, audit.score_b, audit.scores_b),
            selected: audit.selected_variant,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;

    fn scored(text: &str, overall: f64) -> ScoredText {
        ScoredText::new(text, overall, MetricScores::default())
    }

    #[test]
    fn test_higher_score_wins() {
        let selection = AbSelection::decide(scored("a", 61.0), scored("b", 64.5));
        assert_eq!(selection.selected, Variant::B);
        assert_eq!(selection.winner().text, "b");

        let selection = AbSelection::decide(scored("a", 70.0), scored("b", 64.5));
        assert_eq!(selection.selected, Variant::A);
    }

    #[test]
    fn test_tie_selects_a() {
        let selection = AbSelection::decide(scored("a", 72.25), scored("b", 72.25));
        assert_eq!(selection.selected, Variant::A);
        assert_eq!(selection.into_winner().text, "a");
    }

    #[test]
    fn test_audit_shape() {
        let selection = AbSelection::decide(scored("first", 50.0), scored("second", 55.0));
        let json = serde_json::to_value(&selection).unwrap();
        assert_eq!(json["text_a"], "first");
        assert_eq!(json["score_b"], 55.0);
        assert_eq!(json["selected_variant"], "B");
        assert!(json["scores_a"]["keyword"].is_number());

        let back: AbSelection = serde_json::from_value(json).unwrap();
        assert_eq!(back, selection);
    }
}
