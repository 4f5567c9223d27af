//! # Text Normalizer — Deterministic Canonicalization
//!
//! Turns free text into the canonical token string the lexical index is
//! built from. The steps run in a fixed order, each one total:
//!
//! ```text
//! lowercase → split on word boundaries → drop non-alphanumeric tokens
//!           → drop stopwords → lemma table → join with single spaces
//! ```
//!
//! An all-stopword or all-punctuation input normalizes to the empty string;
//! downstream similarity against the resulting zero vector is defined as 0.
//!
//! The stopword set and lemma table are static resources owned by the
//! normalizer, injected once at construction. [`TextNormalizer::new`] wires
//! the built-in English tables; tests can swap fakes in through
//! [`TextNormalizer::with_resources`].

use std::collections::{HashMap, HashSet};

/// English stopwords filtered out during normalization.
///
/// Function words only — content-bearing words stay, even frequent ones,
/// because they carry the overlap signal the fallback ranking depends on.
pub(crate) const STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such",
    "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can",
    "will", "just", "don", "should", "now",
];

/// Irregular noun plurals the suffix rules below cannot reach.
const IRREGULAR_LEMMAS: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("mice", "mouse"),
    ("geese", "goose"),
];

/// Deterministic text canonicalizer (stopword set + lemma table).
///
/// Side-effect free and never failing: any input, including empty or
/// punctuation-only text, produces a (possibly empty) string.
pub struct TextNormalizer {
    stopwords: HashSet<String>,
    lemmas: HashMap<String, String>,
}

impl TextNormalizer {
    /// Builds a normalizer with the built-in English stopword set and
    /// irregular-lemma table.
    pub fn new() -> Self {
        Self::with_resources(
            STOPWORDS.iter().map(|w| w.to_string()).collect(),
            IRREGULAR_LEMMAS
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        )
    }

    /// Builds a normalizer from injected resources (used by tests to supply
    /// fakes; the engine always passes the built-ins).
    pub fn with_resources(stopwords: HashSet<String>, lemmas: HashMap<String, String>) -> Self {
        Self { stopwords, lemmas }
    }

    /// Canonical token string for `text`: lowercased, punctuation-free,
    /// stopword-free, lemmatized, single-space joined.
    pub fn normalize(&self, text: &str) -> String {
        self.tokens(text).join(" ")
    }

    /// Same pipeline as [`normalize`](Self::normalize) but keeps the tokens
    /// separate — the keyword-fallback ranking works on token sets.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split_whitespace()
            .map(|raw| raw.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|token| !token.is_empty() && token.chars().all(|c| c.is_alphanumeric()))
            .filter(|token| !self.stopwords.contains(*token))
            .map(|token| self.lemma(token))
            .collect()
    }

    /// Dictionary base form of a single token: irregular table first, then
    /// regular plural suffix rules. Unknown words pass through unchanged.
    fn lemma(&self, token: &str) -> String {
        if let Some(base) = self.lemmas.get(token) {
            return base.clone();
        }

        // Regular plural endings, longest suffix first. "ss" endings
        // ("address", "business") are singular and stay untouched.
        if let Some(stem) = token.strip_suffix("ies") {
            if stem.len() >= 3 {
                return format!("{stem}y");
            }
        }
        for suffix in ["ches", "shes", "xes"] {
            if let Some(stem) = token.strip_suffix(suffix) {
                if stem.len() >= 2 {
                    return format!("{stem}{}", &suffix[..suffix.len() - 2]);
                }
            }
        }
        if token.len() >= 4 && token.ends_with('s') && !token.ends_with("ss") && !token.ends_with("us") {
            return token[..token.len() - 1].to_string();
        }

        token.to_string()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm() -> TextNormalizer {
        TextNormalizer::new()
    }

    // ─── pipeline steps ────────────────────────────────────────

    #[test]
    fn lowercases_and_strips_punctuation() {
        assert_eq!(norm().normalize("What is your Return POLICY?!"), "return policy");
    }

    #[test]
    fn removes_stopwords() {
        assert_eq!(norm().normalize("How do I track my order?"), "track order");
    }

    #[test]
    fn lemmatizes_regular_plurals() {
        assert_eq!(norm().normalize("30 days"), "30 day");
        assert_eq!(norm().normalize("policies and taxes"), "policy tax");
    }

    #[test]
    fn lemmatizes_irregular_plurals() {
        assert_eq!(norm().normalize("children mice"), "child mouse");
    }

    #[test]
    fn short_and_ss_words_keep_trailing_s() {
        assert_eq!(norm().normalize("gas address status"), "gas address status");
    }

    // ─── edge cases ────────────────────────────────────────────

    #[test]
    fn empty_and_punctuation_only_normalize_to_empty() {
        assert_eq!(norm().normalize(""), "");
        assert_eq!(norm().normalize("   "), "");
        assert_eq!(norm().normalize("?!... ---"), "");
    }

    #[test]
    fn all_stopword_input_normalizes_to_empty() {
        assert_eq!(norm().normalize("what is it to you"), "");
    }

    #[test]
    fn normalization_is_idempotent_on_representative_inputs() {
        let n = norm();
        for input in [
            "What is your return policy?",
            "How do I send something back?",
            "Shipping takes 3-5 business days.",
        ] {
            let once = n.normalize(input);
            assert_eq!(n.normalize(&once), once, "input: {input}");
        }
    }

    #[test]
    fn injected_resources_are_honored() {
        let stopwords = ["foo".to_string()].into_iter().collect();
        let lemmas = [("bars".to_string(), "pub".to_string())].into_iter().collect();
        let n = TextNormalizer::with_resources(stopwords, lemmas);
        assert_eq!(n.normalize("foo bars"), "pub");
    }
}
