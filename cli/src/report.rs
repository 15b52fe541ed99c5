//! Batch report written by `copy-refinery run`

use chrono::{DateTime, Utc};
use copy_refinery_runtime::{BatchOutcome, ProductReport};
use serde::Serialize;
use std::collections::BTreeMap;

/// A product that produced no report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductError {
    /// Product name
    pub product: String,
    /// What went wrong
    pub error: String,
}

/// A product and its final score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreEntry {
    /// Product name
    pub product: String,
    /// Final overall score
    pub score: f64,
}

/// Aggregate scores across a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Products submitted
    pub products: usize,
    /// Products with a report
    pub succeeded: usize,
    /// Products without a report
    pub failed: usize,
    /// Mean final score over reported products
    pub average_score: Option<f64>,
    /// Best final score
    pub highest: Option<ScoreEntry>,
    /// Worst final score
    pub lowest: Option<ScoreEntry>,
    /// How many runs ended for each stop reason
    pub stop_reasons: BTreeMap<String, usize>,
}

impl Summary {
    fn from_reports(reports: &[ProductReport], failed: usize) -> Self {
        let entries: Vec<ScoreEntry> = reports
            .iter()
            .map(|report| ScoreEntry {
                product: report.product.name().to_string(),
                score: report.final_score(),
            })
            .collect();

        #[allow(clippy::cast_precision_loss)]
        let average_score = (!entries.is_empty())
            .then(|| entries.iter().map(|e| e.score).sum::<f64>() / entries.len() as f64);
        let highest = entries
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .cloned();
        let lowest = entries
            .iter()
            .min_by(|a, b| a.score.total_cmp(&b.score))
            .cloned();

        let mut stop_reasons = BTreeMap::new();
        for report in reports {
            *stop_reasons
                .entry(report.refinement.stop_reason.as_str().to_string())
                .or_insert(0) += 1;
        }

        Self {
            products: reports.len() + failed,
            succeeded: reports.len(),
            failed,
            average_score,
            highest,
            lowest,
            stop_reasons,
        }
    }
}

/// Everything a batch produced
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// When the batch finished
    pub generated_at: DateTime<Utc>,
    /// Per-product reports, in input order
    pub reports: Vec<ProductReport>,
    /// Products without a report, in input order
    pub errors: Vec<ProductError>,
    /// Aggregate scores
    pub summary: Summary,
}

impl RunReport {
    /// Split batch outcomes into reports and errors
    #[must_use]
    pub fn from_outcomes(outcomes: Vec<BatchOutcome>, generated_at: DateTime<Utc>) -> Self {
        let mut reports = Vec::new();
        let mut errors = Vec::new();
        for outcome in outcomes {
            match outcome.result {
                Ok(report) => reports.push(report),
                Err(e) => errors.push(ProductError {
                    product: outcome.product,
                    error: e.to_string(),
                }),
            }
        }

        let summary = Summary::from_reports(&reports, errors.len());
        Self {
            generated_at,
            reports,
            errors,
            summary,
        }
    }

    /// Human-readable summary lines
    #[must_use]
    pub fn summary_lines(&self) -> Vec<String> {
        let summary = &self.summary;
        let mut lines = vec![format!(
            "Products: {} ({} succeeded, {} failed)",
            summary.products, summary.succeeded, summary.failed
        )];
        if let Some(average) = summary.average_score {
            lines.push(format!("Average Score: {average:.2}/100"));
        }
        if let Some(high) = &summary.highest {
            lines.push(format!("Highest Score: {:.2}/100 ({})", high.score, high.product));
        }
        if let Some(low) = &summary.lowest {
            lines.push(format!("Lowest Score: {:.2}/100 ({})", low.score, low.product));
        }
        for error in &self.errors {
            lines.push(format!("Failed {}: {}", error.product, error.error));
        }
        lines
    }
}
