//! Input records consumed by the core
//!
//! Product records arrive from external loaders. They are validated once at
//! the boundary so scoring never meets a half-filled record.

use crate::error::ValidationError;
use serde::{Deserialize, Deserializer, Serialize};

/// Immutable description of the product being written about
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawProduct")]
pub struct ProductAttributes {
    name: String,
    features: Vec<String>,
    target_audience: String,
}

impl ProductAttributes {
    /// Create a validated product record
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyField` if the name is blank.
    pub fn new(
        name: impl Into<String>,
        features: Vec<String>,
        target_audience: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }

        let features = features
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();

        Ok(Self {
            name,
            features,
            target_audience: target_audience.into().trim().to_string(),
        })
    }

    /// Product name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered feature list
    #[must_use]
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Intended readership
    #[must_use]
    pub fn target_audience(&self) -> &str {
        &self.target_audience
    }
}

/// Wire shape of a product record. Accepts both snake_case keys and the
/// spreadsheet headers (`"Product Name"`, ...) used by product exports.
#[derive(Deserialize)]
struct RawProduct {
    #[serde(alias = "Product Name")]
    name: String,
    #[serde(
        default,
        alias = "Product Features",
        deserialize_with = "features_list_or_csv"
    )]
    features: Vec<String>,
    #[serde(default, alias = "Target Audience")]
    target_audience: String,
}

impl TryFrom<RawProduct> for ProductAttributes {
    type Error = ValidationError;

    fn try_from(raw: RawProduct) -> Result<Self, Self::Error> {
        Self::new(raw.name, raw.features, raw.target_audience)
    }
}

fn features_list_or_csv<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Features {
        List(Vec<String>),
        Csv(String),
    }

    Ok(match Features::deserialize(deserializer)? {
        Features::List(list) => list,
        Features::Csv(csv) => csv.split(',').map(str::to_string).collect(),
    })
}

/// Up to five keyword phrases, matched case-insensitively
///
/// Construction trims entries, drops blanks and case-insensitive duplicates
/// (first spelling wins), then truncates to [`KeywordSet::MAX_KEYWORDS`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    /// Maximum number of keywords carried into generation and scoring
    pub const MAX_KEYWORDS: usize = 5;

    /// Build a normalized keyword set
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen: Vec<String> = Vec::new();
        let mut kept = Vec::new();

        for keyword in keywords {
            let keyword = keyword.into().trim().to_string();
            if keyword.is_empty() {
                continue;
            }
            let folded = keyword.to_lowercase();
            if seen.contains(&folded) {
                continue;
            }
            seen.push(folded);
            kept.push(keyword);
            if kept.len() == Self::MAX_KEYWORDS {
                break;
            }
        }

        Self { keywords: kept }
    }

    /// Empty set (no keyword constraint)
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            keywords: Vec::new(),
        }
    }

    /// Keywords in their original order and spelling
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.keywords
    }

    /// Iterate over keywords
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    /// Number of keywords
    #[must_use]
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

impl From<Vec<String>> for KeywordSet {
    fn from(keywords: Vec<String>) -> Self {
        Self::new(keywords)
    }
}

impl From<KeywordSet> for Vec<String> {
    fn from(set: KeywordSet) -> Self {
        set.keywords
    }
}

/// Append-only pool of accepted descriptions used for uniqueness scoring
///
/// A run works on its own clone; appends made by one run are never visible
/// to another.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorpusPool {
    texts: Vec<String>,
}

impl CorpusPool {
    /// Create an empty pool
    #[must_use]
    pub const fn new() -> Self {
        Self { texts: Vec::new() }
    }

    /// Append an accepted text
    pub fn push(&mut self, text: impl Into<String>) {
        self.texts.push(text.into());
    }

    /// All texts in insertion order
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.texts
    }

    /// Number of texts
    #[must_use]
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Whether the pool is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

impl From<Vec<String>> for CorpusPool {
    fn from(texts: Vec<String>) -> Self {
        Self { texts }
    }
}

impl<S: Into<String>> FromIterator<S> for CorpusPool {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            texts: iter.into_iter().map(Into::into).collect(),
        }
    }
}
