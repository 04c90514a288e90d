//! Marketing copy for card pages: the record shape, the generator seam and
//! the structural checks every record must pass.

pub mod fallback;
pub mod generator;
pub mod openai;
pub mod prompt;

pub use fallback::fallback_content;
pub use generator::LlmContentGenerator;

use crate::catalog::CatalogEntry;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of FAQ pairs on every card page.
pub const FAQ_COUNT: usize = 6;
/// Allowed size of the denomination ladder.
pub const MIN_DENOMINATIONS: usize = 4;
pub const MAX_DENOMINATIONS: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    /// May contain `<strong>`, `<em>` and `<a>` tags.
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Denomination {
    pub value: f64,
    /// ISO 4217 code, e.g. `USD`.
    pub currency: String,
    pub label: String,
}

/// SEO and page copy for one card. Immutable once cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedContent {
    pub meta_title: String,
    pub meta_description: String,
    pub hero_headline: String,
    pub hero_subheadline: String,
    pub about_title: String,
    pub about_body: String,
    pub why_buy_title: String,
    pub why_buy_body: String,
    pub faqs: Vec<Faq>,
    pub denominations: Vec<Denomination>,
}

/// Why a generator handed back templated copy instead of provider output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No provider credential is configured.
    NoCredential,
    /// The provider call failed, timed out or returned nothing usable.
    Provider(String),
    /// The provider answered, but the record broke a structural rule.
    InvalidContent(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NoCredential => write!(f, "no provider credential configured"),
            FallbackReason::Provider(msg) => write!(f, "provider error: {msg}"),
            FallbackReason::InvalidContent(msg) => write!(f, "invalid provider content: {msg}"),
        }
    }
}

/// Outcome of one generation call.
#[derive(Debug, Clone, PartialEq)]
pub enum Generation {
    Generated(GeneratedContent),
    Fallback {
        content: GeneratedContent,
        reason: FallbackReason,
    },
}

impl Generation {
    pub fn content(&self) -> &GeneratedContent {
        match self {
            Generation::Generated(content) | Generation::Fallback { content, .. } => content,
        }
    }

    pub fn into_content(self) -> GeneratedContent {
        match self {
            Generation::Generated(content) | Generation::Fallback { content, .. } => content,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Generation::Fallback { .. })
    }
}

/// A failure the generator could not absorb into a fallback.
#[derive(Debug, Clone, thiserror::Error)]
#[error("content generation failed for {id}: {message}")]
pub struct GenerateError {
    pub id: String,
    pub message: String,
}

impl GenerateError {
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        GenerateError {
            id: id.into(),
            message: message.into(),
        }
    }
}

/// Produces copy for one catalogue entry. Stateless between calls.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, entry: &CatalogEntry) -> Result<Generation, GenerateError>;
}

/// Always returns the templated copy. Used when no provider is wanted at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackGenerator;

#[async_trait]
impl ContentGenerator for FallbackGenerator {
    async fn generate(&self, entry: &CatalogEntry) -> Result<Generation, GenerateError> {
        Ok(Generation::Fallback {
            content: fallback_content(entry),
            reason: FallbackReason::NoCredential,
        })
    }
}

/// Structural rule a [`GeneratedContent`] violated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct InvalidContent(pub String);

/// Check every structural rule of a content record: required strings are
/// non-empty, exactly [`FAQ_COUNT`] FAQs, and a 4–6 step ladder of positive,
/// non-decreasing denominations with ISO currency codes.
pub fn validate(content: &GeneratedContent) -> Result<(), InvalidContent> {
    let required = [
        ("metaTitle", &content.meta_title),
        ("metaDescription", &content.meta_description),
        ("heroHeadline", &content.hero_headline),
        ("heroSubheadline", &content.hero_subheadline),
        ("aboutTitle", &content.about_title),
        ("aboutBody", &content.about_body),
        ("whyBuyTitle", &content.why_buy_title),
        ("whyBuyBody", &content.why_buy_body),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(InvalidContent(format!("{field} is empty")));
        }
    }

    if content.faqs.len() != FAQ_COUNT {
        return Err(InvalidContent(format!(
            "expected {FAQ_COUNT} faqs, got {}",
            content.faqs.len()
        )));
    }
    if let Some(pos) = content
        .faqs
        .iter()
        .position(|f| f.question.trim().is_empty() || f.answer.trim().is_empty())
    {
        return Err(InvalidContent(format!("faq #{} is empty", pos + 1)));
    }

    let count = content.denominations.len();
    if !(MIN_DENOMINATIONS..=MAX_DENOMINATIONS).contains(&count) {
        return Err(InvalidContent(format!(
            "expected {MIN_DENOMINATIONS}-{MAX_DENOMINATIONS} denominations, got {count}"
        )));
    }
    let mut previous = 0.0_f64;
    for d in &content.denominations {
        if !d.value.is_finite() || d.value <= 0.0 {
            return Err(InvalidContent(format!("denomination {} is not positive", d.value)));
        }
        if d.value < previous {
            return Err(InvalidContent("denominations are not in ascending order".into()));
        }
        if d.currency.len() != 3 || !d.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(InvalidContent(format!("bad currency code {:?}", d.currency)));
        }
        if d.label.trim().is_empty() {
            return Err(InvalidContent("denomination label is empty".into()));
        }
        previous = d.value;
    }

    Ok(())
}
