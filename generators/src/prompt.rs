//! Prompt rendering shared by every backend

use copy_refinery_core::GenerationRequest;
use std::fmt::Write as _;

/// System prompt for chat-style backends
pub const SYSTEM_PROMPT: &str = "You are an experienced e-commerce copywriter. \
You write accurate, persuasive product descriptions that read naturally and rank well in search.";

/// Render the user prompt for `request`
///
/// Layout: instruction, product block, keyword line (omitted when there are
/// no keywords), then the current draft for rewrites.
#[must_use]
pub fn render_prompt(request: &GenerationRequest) -> String {
    let product = &request.product;
    let mut prompt = String::with_capacity(512);

    prompt.push_str(&request.instruction);
    prompt.push_str("\n\n");

    let _ = writeln!(prompt, "Product Name: {}", product.name());
    if !product.features().is_empty() {
        let _ = writeln!(prompt, "Features: {}", product.features().join(", "));
    }
    if !product.target_audience().is_empty() {
        let _ = writeln!(prompt, "Target Audience: {}", product.target_audience());
    }
    if !request.keywords.is_empty() {
        let _ = writeln!(prompt, "Keywords to include: {}", request.keywords.as_slice().join(", "));
    }

    if let Some(draft) = &request.draft {
        let _ = write!(prompt, "\nCurrent description:\n{draft}\n");
    }

    prompt
}
