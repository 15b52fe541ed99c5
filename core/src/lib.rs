//! # Copy Refinery Core
//!
//! Functional core for generating and refining SEO product copy.
//!
//! ## Core Concepts
//!
//! - **Metrics**: five pure functions scoring keyword density, readability,
//!   length, structure and uniqueness in `[0, 1]`
//! - **Scorer**: weighted composite of the metrics, `[0, 100]`
//! - **Selection**: A/B decision between two initial candidates
//! - **Refinement**: reducer that rewrites the weakest metric until the
//!   score plateaus, every metric saturates, or the budget runs out
//! - **Generator**: async seam any text backend plugs into
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell: this crate performs no I/O
//! - Explicit Effects: the refinement reducer describes rewrites, the
//!   runtime carries them out
//! - Validated configuration: invalid weights or bounds fail at construction
//!
//! ## Example
//!
//! ```
//! use copy_refinery_core::{CompositeScorer, CorpusPool, KeywordSet};
//!
//! let scorer = CompositeScorer::default();
//! let keywords = KeywordSet::new(["wireless mouse"]);
//! let scored = scorer.score_description(
//!     "A wireless mouse built for long days.",
//!     &keywords,
//!     &CorpusPool::new(),
//! );
//! assert!((0.0..=100.0).contains(&scored.overall_score));
//! ```

pub mod error;
pub mod generator;
pub mod metrics;
pub mod reducer;
pub mod refinement;
pub mod score;
pub mod scorer;
pub mod selection;
pub mod types;

pub use error::{ConfigError, GenerationFailure, MetricComputationFailure, ValidationError};
pub use generator::{CandidateGenerator, GenerationRequest};
pub use reducer::Reducer;
pub use refinement::{
    Interruption, IterationOutcome, IterationRecord, RefinementAction, RefinementConfig,
    RefinementEffect, RefinementReducer, RefinementResult, RefinementState, RewriteRequest,
    StopReason,
};
pub use score::{Metric, MetricScores, ScoredText};
pub use scorer::{CompositeScorer, MetricWeights, ScoringConfig, TextScorer};
pub use selection::{AbSelection, Variant};
pub use types::{CorpusPool, KeywordSet, ProductAttributes};

// Reducers return effects in a SmallVec
pub use smallvec::{SmallVec, smallvec};
