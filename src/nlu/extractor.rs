//! # Entity Extraction — Enrichment-Only Plug-in
//!
//! Optional capability the confidence gate calls on the UNMATCHED path to
//! make the clarification message more helpful ("I noticed you mentioned
//! MONEY: $50"). Extraction never affects ranking, and the gate's contract
//! holds with no extractor wired in at all.
//!
//! The built-in [`RegexEntityExtractor`] tags surface patterns:
//!
//! | Label | Example span |
//! |-------|--------------|
//! | EMAIL | `jane@example.com` |
//! | URL | `https://example.com/orders` |
//! | MONEY | `$49.99`, `30 dollars` |
//! | DATE | `2026-08-29`, `12/05/2026`, `March 3` |
//! | NUMBER | `30` (unless inside another span) |

use std::collections::BTreeMap;

use regex::Regex;

/// Plug-in interface: one method, label → extracted span text.
///
/// Implementations must be pure over their input text; the engine may call
/// them from concurrent queries.
pub trait EntityExtraction: Send + Sync {
    fn extract(&self, text: &str) -> BTreeMap<String, String>;
}

/// Regex-backed extractor for common surface entities.
///
/// Regexes are compiled once at construction and reused for every query.
pub struct RegexEntityExtractor {
    /// (label, pattern) pairs, evaluated in order; first match per label wins.
    patterns: Vec<(&'static str, Regex)>,
}

impl RegexEntityExtractor {
    pub fn new() -> Self {
        let patterns = vec![
            (
                "EMAIL",
                Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap(),
            ),
            ("URL", Regex::new(r"https?://[^\s]+").unwrap()),
            (
                "MONEY",
                Regex::new(r"[$€£]\s?\d+(?:[.,]\d{2})?|\b\d+(?:\.\d{2})?\s?(?:dollars|euros|pounds|USD|EUR|GBP)\b").unwrap(),
            ),
            (
                "DATE",
                Regex::new(
                    r"\b\d{4}-\d{2}-\d{2}\b|\b\d{1,2}/\d{1,2}/\d{2,4}\b|\b(?i:january|february|march|april|may|june|july|august|september|october|november|december)\s+\d{1,2}\b",
                )
                .unwrap(),
            ),
            ("NUMBER", Regex::new(r"\b\d+\b").unwrap()),
        ];
        Self { patterns }
    }
}

impl Default for RegexEntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityExtraction for RegexEntityExtractor {
    fn extract(&self, text: &str) -> BTreeMap<String, String> {
        let mut entities = BTreeMap::new();
        // Byte ranges already claimed by an earlier label; a bare NUMBER
        // inside a DATE or MONEY span is not a separate entity.
        let mut claimed: Vec<(usize, usize)> = Vec::new();

        for (label, pattern) in &self.patterns {
            let Some(found) = pattern
                .find_iter(text)
                .find(|m| !claimed.iter().any(|&(s, e)| m.start() >= s && m.end() <= e))
            else {
                continue;
            };
            claimed.push((found.start(), found.end()));
            entities.insert(label.to_string(), found.as_str().to_string());
        }

        entities
    }
}
