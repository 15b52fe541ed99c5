//! Keyword sources
//!
//! Keyword mining lives outside this workspace; the pipeline only needs a
//! ranked list per product.

use async_trait::async_trait;
use copy_refinery_core::{KeywordSet, ProductAttributes};
use std::collections::HashMap;

/// Minimum feature count before features stand in for missing keywords
pub const FEATURE_FALLBACK_MIN_FEATURES: usize = 3;

/// Supplies ranked keywords for a product
#[async_trait]
pub trait KeywordSource: Send + Sync {
    /// Keywords for `product`, best first; empty when none are known
    async fn keywords_for(&self, product: &ProductAttributes) -> KeywordSet;
}

/// In-memory keywords keyed by product name (case-insensitive)
#[derive(Debug, Clone, Default)]
pub struct StaticKeywordSource {
    by_name: HashMap<String, KeywordSet>,
}

impl StaticKeywordSource {
    /// Empty source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: register keywords for a product name
    #[must_use]
    pub fn with<I, S>(mut self, product_name: &str, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(product_name, keywords);
        self
    }

    /// Register keywords for a product name, keeping the top five
    pub fn insert<I, S>(&mut self, product_name: &str, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.by_name
            .insert(normalize(product_name), KeywordSet::new(keywords));
    }

    /// Number of products with keywords
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether no product has keywords
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, Vec<String>)> for StaticKeywordSource {
    fn from_iter<T: IntoIterator<Item = (S, Vec<String>)>>(iter: T) -> Self {
        let mut source = Self::new();
        for (name, keywords) in iter {
            source.insert(name.as_ref(), keywords);
        }
        source
    }
}

#[async_trait]
impl KeywordSource for StaticKeywordSource {
    async fn keywords_for(&self, product: &ProductAttributes) -> KeywordSet {
        self.by_name
            .get(&normalize(product.name()))
            .cloned()
            .unwrap_or_default()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Features standing in for keywords when no keywords were found
///
/// Returns the first five features when the product has at least three,
/// otherwise an empty set.
#[must_use]
pub fn feature_fallback(product: &ProductAttributes) -> KeywordSet {
    if product.features().len() >= FEATURE_FALLBACK_MIN_FEATURES {
        KeywordSet::new(product.features().iter().map(String::as_str))
    } else {
        KeywordSet::empty()
    }
}
