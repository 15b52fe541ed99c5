//! # Copy Refinery Runtime
//!
//! Imperative shell around the refinement core.
//!
//! ## Core Components
//!
//! - **Selector**: generates two initial candidates and keeps the better one
//! - **Refiner**: executes refinement reducer effects against the generator
//!   and scorer seams
//! - **Pipeline**: keywords → A/B selection → refinement for one product
//! - **Batch runner**: many products concurrently, each with a private corpus
//!
//! ## Example
//!
//! ```ignore
//! use copy_refinery_runtime::{BatchConfig, BatchRunner, ProductPipeline, StaticKeywordSource};
//!
//! let pipeline = ProductPipeline::new(generator, scorer, Arc::new(StaticKeywordSource::new()), reducer);
//! let runner = BatchRunner::new(Arc::new(pipeline), BatchConfig::default())?;
//!
//! let outcomes = runner.run(jobs, &corpus).await;
//! ```

/// Batch execution across products
pub mod batch;

/// Cooperative cancellation
pub mod cancellation;

/// Pipeline errors
pub mod error;

/// Keyword sources and the feature fallback
pub mod keywords;

/// Prometheus metrics for observability
pub mod metrics;

/// Per-product pipeline
pub mod pipeline;

/// Refinement driver
pub mod refiner;

/// A/B selection
pub mod selector;

pub use batch::{BatchConfig, BatchOutcome, BatchRunner};
pub use cancellation::{CancellationFlag, cancel_on_signal};
pub use error::PipelineError;
pub use keywords::{KeywordSource, StaticKeywordSource, feature_fallback};
pub use pipeline::{ProductJob, ProductPipeline, ProductReport};
pub use refiner::Refiner;
pub use selector::select_candidate;
