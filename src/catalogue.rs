//! # Catalogue — The Known Question/Answer Pairs
//!
//! The [`Catalogue`] is the fixed set of question/answer pairs the engine
//! matches against: an ordered sequence, addressable by position. Position `i`
//! here always corresponds to row `i` in the lexical and semantic index
//! matrices — any append invalidates both indices, which is why growth only
//! happens through [`FaqEngine::add_entry`](crate::engine::FaqEngine::add_entry)
//! (append + full rebuild, never in place).
//!
//! Entries are immutable once loaded; there is no delete or edit operation.

use serde::{Deserialize, Serialize};

/// One known question with its canned answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogueEntry {
    pub question: String,
    pub answer: String,
}

impl CatalogueEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Ordered, index-addressable sequence of [`CatalogueEntry`] values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalogue {
    entries: Vec<CatalogueEntry>,
}

impl Catalogue {
    pub fn new(entries: Vec<CatalogueEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&CatalogueEntry> {
        self.entries.get(position)
    }

    pub fn entries(&self) -> &[CatalogueEntry] {
        &self.entries
    }

    /// Question texts in catalogue order — the input both indices are built from.
    pub fn questions(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.question.clone()).collect()
    }

    /// Appends an entry verbatim. Callers own the index rebuild that this
    /// makes necessary.
    pub fn push(&mut self, entry: CatalogueEntry) {
        self.entries.push(entry);
    }
}

/// Built-in starter catalogue, used when no stored catalogue exists yet.
///
/// Deliberately refund-heavy: close paraphrases exercise the hybrid matcher
/// more than a flat topic list would.
pub fn default_catalogue() -> Catalogue {
    let pairs: &[(&str, &str)] = &[
        (
            "What is your return policy?",
            "You can return any item within 30 days of delivery for a full refund.",
        ),
        (
            "How do I track my order?",
            "Use the tracking link in your confirmation email to follow your package.",
        ),
        (
            "How do I request a refund?",
            "Open your order history, select the order, and choose \"Request refund\".",
        ),
        (
            "How long does shipping take?",
            "Standard shipping takes 3-5 business days.",
        ),
        (
            "What payment methods do you accept?",
            "We accept all major credit cards, debit cards, and PayPal.",
        ),
        (
            "How can I contact customer support?",
            "Email support@example.com or use the contact form on our website.",
        ),
    ];

    Catalogue::new(
        pairs
            .iter()
            .map(|(q, a)| CatalogueEntry::new(*q, *a))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_stable_after_push() {
        let mut catalogue = default_catalogue();
        let first = catalogue.get(0).unwrap().question.clone();
        catalogue.push(CatalogueEntry::new("Do you ship abroad?", "Yes, worldwide."));
        assert_eq!(catalogue.get(0).unwrap().question, first);
        assert_eq!(
            catalogue.get(catalogue.len() - 1).unwrap().question,
            "Do you ship abroad?"
        );
    }

    #[test]
    fn default_catalogue_is_non_empty() {
        assert!(!default_catalogue().is_empty());
    }

    #[test]
    fn serializes_as_plain_array() {
        let catalogue = Catalogue::new(vec![CatalogueEntry::new("q", "a")]);
        let json = serde_json::to_string(&catalogue).unwrap();
        assert_eq!(json, r#"[{"question":"q","answer":"a"}]"#);
    }
}
