//! # Copy Refinery Generators
//!
//! Text backends behind the [`CandidateGenerator`] seam.
//!
//! ## Example
//!
//! ```no_run
//! use copy_refinery_core::{CandidateGenerator, GenerationRequest, KeywordSet, ProductAttributes};
//! use copy_refinery_generators::{RetryConfig, RetryingGenerator, OllamaGenerator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let generator = RetryingGenerator::new(OllamaGenerator::default(), RetryConfig::default());
//!
//!     let product = ProductAttributes::new(
//!         "Wireless Mouse",
//!         vec!["ergonomic design".to_string()],
//!         "office workers",
//!     )?;
//!     let request = GenerationRequest::initial(product, KeywordSet::new(["wireless mouse"]));
//!
//!     let text = generator.generate(&request).await?;
//!     println!("{text}");
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - Anthropic Messages API backend
//! - Local Ollama backend
//! - Per-attempt timeout with fixed or exponential retry

pub mod anthropic;
pub mod config;
pub mod ollama;
pub mod prompt;
pub mod retry;

pub use anthropic::AnthropicGenerator;
pub use config::{Backend, LlmConfig};
pub use copy_refinery_core::CandidateGenerator;
pub use ollama::OllamaGenerator;
pub use prompt::render_prompt;
pub use retry::{RetryConfig, RetryPolicy, RetryingGenerator};
