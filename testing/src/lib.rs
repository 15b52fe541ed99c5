//! # Copy Refinery Testing
//!
//! Testing utilities for the copy refinement workspace.
//!
//! This crate provides:
//! - Scripted doubles for the generator and scorer seams
//! - Fixtures (the Wireless Mouse product, sample corpus)
//! - `ReducerTest`, a Given-When-Then helper for reducers
//! - proptest strategies for domain types
//!
//! ## Example
//!
//! ```ignore
//! use copy_refinery_testing::{fixtures, mocks::{ScriptedGenerator, ScriptedScorer}};
//!
//! #[tokio::test]
//! async fn test_refinement_converges() {
//!     let generator = ScriptedGenerator::new(["rewrite one"]);
//!     let scorer = ScriptedScorer::with_sequence([70.3]);
//!     // drive the refiner with fixtures::wireless_mouse() ...
//! }
//! ```

pub mod fixtures;
pub mod mocks;
pub mod properties;

pub use mocks::{FailingGenerator, ScriptedGenerator, ScriptedScorer};
pub use reducer_test::{ReducerTest, assertions};

/// Install a test-friendly tracing subscriber
///
/// Safe to call from many tests; only the first call installs it. Honors
/// `RUST_LOG` and defaults to `warn`.
pub fn init_test_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
