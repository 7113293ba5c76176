//! Phrase-list entity recognizer.
//!
//! Entries are matched as whole token sequences, case-insensitively, with the
//! longest entry winning at each position. Matching is exact; there is no
//! fuzzy or stemmed matching of entity names.

use crate::catalog::Table;

use super::tokenizer::tokenize;
use super::{Analysis, EntityLabel, EntitySpan, TextAnalyzer};

/// Names recognized as organizations rather than products.
pub const DEFAULT_ORGANIZATIONS: &[&str] = &[
    "aws",
    "amazon",
    "amazon web services",
    "azure",
    "microsoft",
    "microsoft azure",
    "google",
    "gcp",
    "google cloud",
];

/// A phrase the recognizer knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GazetteerEntry {
    /// Lowercased token texts of the phrase.
    tokens: Vec<String>,
    pub label: EntityLabel,
}

impl GazetteerEntry {
    pub fn new(phrase: &str, label: EntityLabel) -> Self {
        Self {
            tokens: tokenize(&phrase.to_lowercase())
                .into_iter()
                .map(|t| t.text)
                .collect(),
            label,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Default [`TextAnalyzer`]: regex tokens, singular lemmas, gazetteer NER.
#[derive(Debug, Clone, Default)]
pub struct GazetteerAnalyzer {
    entries: Vec<GazetteerEntry>,
}

impl GazetteerAnalyzer {
    pub fn new(entries: Vec<GazetteerEntry>) -> Self {
        let mut entries: Vec<_> = entries.into_iter().filter(|e| !e.is_empty()).collect();
        // Longest phrases first so that "azure functions" beats "azure".
        entries.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.tokens.cmp(&b.tokens)));
        entries.dedup_by(|a, b| a.tokens == b.tokens);
        Self { entries }
    }

    /// Build the phrase list from every TEXT column's examples.
    ///
    /// Examples that name a known organization are labeled ORG, the rest PRODUCT.
    pub fn from_table(table: &Table, organizations: &[&str]) -> Self {
        let entries = table
            .text_columns()
            .flat_map(|column| column.examples.iter())
            .map(|example| {
                let lowered = example.to_lowercase();
                let label = if organizations.contains(&lowered.as_str()) {
                    EntityLabel::Org
                } else {
                    EntityLabel::Product
                };
                GazetteerEntry::new(example, label)
            })
            .collect();
        Self::new(entries)
    }

    pub fn entries(&self) -> &[GazetteerEntry] {
        &self.entries
    }
}

impl TextAnalyzer for GazetteerAnalyzer {
    fn analyze(&self, text: &str) -> Analysis {
        let tokens = tokenize(text);
        let lowered: Vec<String> = tokens.iter().map(|t| t.text.to_lowercase()).collect();
        let mut entities = Vec::new();

        let mut i = 0;
        while i < tokens.len() {
            let hit = self.entries.iter().find(|entry| {
                let end = i + entry.len();
                end <= lowered.len() && lowered[i..end] == entry.tokens[..]
            });

            match hit {
                Some(entry) => {
                    let end = i + entry.len();
                    entities.push(EntitySpan {
                        text: text[tokens[i].start..tokens[end - 1].end].to_string(),
                        label: entry.label,
                        start_token: i,
                        end_token: end,
                    });
                    i = end;
                }
                None => i += 1,
            }
        }

        Analysis { tokens, entities }
    }
}
