//! Pipeline errors

use copy_refinery_core::GenerationFailure;
use thiserror::Error;

/// Why a product produced no report
///
/// A report whose refinement stopped early (generator failure mid-loop,
/// cancellation after the A/B step) is still a report; these errors mean
/// there was nothing to report.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PipelineError {
    /// An A/B candidate could not be generated
    #[error("no initial candidate: {0}")]
    NoInitialCandidate(#[source] GenerationFailure),

    /// The batch was cancelled before this product started
    #[error("cancelled before the product started")]
    Cancelled,

    /// The worker task running this product aborted
    #[error("worker task failed: {0}")]
    TaskFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_display() {
        let err = PipelineError::NoInitialCandidate(GenerationFailure::EmptyOutput);
        assert_eq!(
            err.to_string(),
            "no initial candidate: Generator returned empty content"
        );
        assert_eq!(
            PipelineError::Cancelled.to_string(),
            "cancelled before the product started"
        );
    }
}
