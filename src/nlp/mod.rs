//! Text analysis boundary for the intent parser.
//!
//! The parser needs three capabilities from an NLP component:
//!
//! - lemma-aware tokenization
//! - numeral detection (`like_num`)
//! - named-entity spans with organization/product/geo labels
//!
//! Any implementation of [`TextAnalyzer`] can be plugged into the parser.
//! The default, [`GazetteerAnalyzer`], tokenizes with a regex, lemmatizes by
//! singularization, and recognizes entities from a phrase list built out of
//! the catalog's example values.

mod gazetteer;
mod tokenizer;

pub use gazetteer::{GazetteerAnalyzer, GazetteerEntry, DEFAULT_ORGANIZATIONS};
pub use tokenizer::{lemmatize, like_num, tokenize};

use serde::Serialize;

/// A single token of the analyzed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Surface text.
    pub text: String,
    /// Base form (singular for nouns).
    pub lemma: String,
    /// Whether the token looks like a number ("3", "1,000", "three").
    pub like_num: bool,
    /// Byte offset of the token start.
    pub start: usize,
    /// Byte offset one past the token end.
    pub end: usize,
}

/// Entity label classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityLabel {
    Org,
    Product,
    Gpe,
    Other,
}

impl EntityLabel {
    /// Labels that can name a provider or a service.
    pub fn is_linkable(&self) -> bool {
        matches!(self, EntityLabel::Org | EntityLabel::Product | EntityLabel::Gpe)
    }
}

/// A recognized entity span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySpan {
    pub text: String,
    pub label: EntityLabel,
    /// Index of the first token of the span.
    pub start_token: usize,
    /// Index one past the last token of the span.
    pub end_token: usize,
}

/// Output of a text analyzer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub tokens: Vec<Token>,
    pub entities: Vec<EntitySpan>,
}

/// Tokenizer + lemmatizer + NER capability.
pub trait TextAnalyzer: std::fmt::Debug + Send + Sync {
    fn analyze(&self, text: &str) -> Analysis;
}
