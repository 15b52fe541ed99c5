//! The candidate generator seam
//!
//! Any text backend (hosted model, local model, scripted test double) plugs
//! in by implementing [`CandidateGenerator`]. Output is non-deterministic by
//! contract; the core never assumes two calls return the same text.

use crate::error::GenerationFailure;
use crate::refinement::RewriteRequest;
use crate::score::Metric;
use crate::types::{KeywordSet, ProductAttributes};
use async_trait::async_trait;

/// Brief for a fresh product description
pub const INITIAL_INSTRUCTION: &str = "Generate a unique, SEO-friendly product description. \
Keep the description between 100-150 words. Weave the keywords in naturally, \
highlight the features that matter to the target audience, and write only the \
description without any headings about the task.";

/// What a rewrite should change for a given weak metric
#[must_use]
pub const fn rewrite_focus(metric: Metric) -> &'static str {
    match metric {
        Metric::Keyword => {
            "Use each keyword naturally once or twice. Avoid both stuffing and leaving keywords out."
        }
        Metric::Readability => {
            "Make it easier to read: shorter sentences, plain everyday words, active voice."
        }
        Metric::Length => "Bring the length to between 100 and 150 words.",
        Metric::Structure => {
            "Give it structure: short paragraphs separated by blank lines, a heading line \
             ending in a colon, and a bulleted list of key features."
        }
        Metric::Uniqueness => {
            "Rephrase it with fresh wording so it does not read like other product copy."
        }
    }
}

/// Everything a backend needs to produce one candidate
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Product being described
    pub product: ProductAttributes,
    /// Keywords to work in
    pub keywords: KeywordSet,
    /// Task brief
    pub instruction: String,
    /// Draft to rewrite, for targeted rewrites
    pub draft: Option<String>,
    /// Metric a rewrite targets
    pub target: Option<Metric>,
}

impl GenerationRequest {
    /// Request a fresh description
    #[must_use]
    pub fn initial(product: ProductAttributes, keywords: KeywordSet) -> Self {
        Self {
            product,
            keywords,
            instruction: INITIAL_INSTRUCTION.to_string(),
            draft: None,
            target: None,
        }
    }

    /// Request a rewrite of `rewrite.draft` that fixes `rewrite.target`
    #[must_use]
    pub fn rewrite(product: ProductAttributes, keywords: KeywordSet, rewrite: &RewriteRequest) -> Self {
        let instruction = format!(
            "Rewrite the product description below to improve its {} score (currently {:.1} out of 100). {} \
             Keep everything else that already works, stay accurate to the product, and \
             write only the revised description.",
            rewrite.target,
            rewrite.scores.get(rewrite.target),
            rewrite_focus(rewrite.target),
        );
        Self {
            product,
            keywords,
            instruction,
            draft: Some(rewrite.draft.clone()),
            target: Some(rewrite.target),
        }
    }

    /// Whether this is a targeted rewrite
    #[must_use]
    pub const fn is_rewrite(&self) -> bool {
        self.draft.is_some()
    }
}

/// Produces candidate text for a request
///
/// Implementations must return [`GenerationFailure::EmptyOutput`] rather
/// than an empty string.
#[async_trait]
pub trait CandidateGenerator: Send + Sync {
    /// Generate one candidate
    ///
    /// # Errors
    ///
    /// Returns `GenerationFailure` when the backend cannot produce text.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationFailure>;
}

#[async_trait]
impl<G: CandidateGenerator + ?Sized> CandidateGenerator for std::sync::Arc<G> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationFailure> {
        (**self).generate(request).await
    }
}
