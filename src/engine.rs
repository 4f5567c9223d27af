//! # FAQ Engine — Confidence Gate over the Hybrid Matcher
//!
//! The [`FaqEngine`] is the component the shells (console loop, web form)
//! talk to. Per query it is a small, stateless state machine:
//!
//! ```text
//! respond(query)
//!   ├── EMPTY     blank/whitespace → validation message, confidence 0
//!   ├── EXIT      "quit" | "exit" | "bye" (case-insensitive) → farewell
//!   ├── MATCHED   hybrid confidence ≥ threshold → catalogue answer
//!   └── UNMATCHED below threshold → clarification, optionally enriched
//!                 with entities found in the raw query
//! ```
//!
//! Every arm is terminal and queries never observe each other's state.
//! The only mutator is [`add_entry`](FaqEngine::add_entry): it appends to
//! the catalogue and swaps in a freshly built [`MatchPipeline`] under the
//! write lock — queries either see the old build or the new one, never a
//! half-rebuilt index. A failed rebuild leaves the old build active.
//!
//! The keyword fallback ([`keyword_fallback`](FaqEngine::keyword_fallback))
//! is a secondary ranking the shells use on the UNMATCHED path to offer
//! alternatives; it never runs automatically.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use crate::catalogue::{Catalogue, CatalogueEntry};
use crate::error::EngineError;
use crate::nlu::extractor::EntityExtraction;
use crate::nlu::normalizer::TextNormalizer;
use crate::nlu::semantic::Embedder;
use crate::nlu::{MatchPipeline, MatchWeights};
use crate::persistence::CatalogueStore;

const VALIDATION_MESSAGE: &str = "Please enter a valid question.";
const FAREWELL_MESSAGE: &str = "Goodbye! Have a great day.";
const CLARIFICATION_MESSAGE: &str =
    "I'm not sure I understand your question fully. Could you rephrase it?";

/// Engine configuration, immutable after startup.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum blended confidence for returning a catalogue answer.
    pub confidence_threshold: f64,
    /// Blend weights for the hybrid confidence.
    pub weights: MatchWeights,
    /// Queries that end the conversation instead of being matched.
    pub exit_keywords: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.4,
            weights: MatchWeights::default(),
            exit_keywords: vec!["quit".into(), "exit".into(), "bye".into()],
        }
    }
}

/// The stable triple every shell depends on.
///
/// `matched_question` is `None` exactly when the confidence stayed below
/// the threshold (or the query short-circuited through EMPTY/EXIT).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub answer: String,
    pub matched_question: Option<String>,
    pub confidence: f64,
}

/// One keyword-fallback suggestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    /// Catalogue position of the suggested question.
    pub position: usize,
    pub question: String,
    /// `|common normalized tokens| / |question's normalized tokens|`.
    pub overlap: f64,
}

/// Outcome of [`FaqEngine::add_entry`]: the entry is always live in memory
/// when this is returned; `warning` reports a failed save to the store.
pub struct AddReport {
    pub persisted: bool,
    pub warning: Option<EngineError>,
}

/// Catalogue and pipeline swap together so position `i` always means the
/// same entry on both sides of the lock.
struct MatchState {
    catalogue: Catalogue,
    pipeline: MatchPipeline,
}

/// The matching engine: frozen indices behind a lock, plus the static
/// resources (normalizer, embedder, config) built once at startup.
pub struct FaqEngine {
    state: RwLock<MatchState>,
    config: EngineConfig,
    normalizer: Arc<TextNormalizer>,
    embedder: Arc<Embedder>,
    extractor: Option<Box<dyn EntityExtraction>>,
    store: Option<CatalogueStore>,
}

impl FaqEngine {
    /// Builds the engine over a loaded catalogue.
    ///
    /// # Errors
    ///
    /// [`EngineError::Configuration`] if the catalogue is empty or the
    /// initial index build fails — fatal to startup, never retried.
    pub fn new(
        catalogue: Catalogue,
        config: EngineConfig,
        store: Option<CatalogueStore>,
        extractor: Option<Box<dyn EntityExtraction>>,
    ) -> Result<Self, EngineError> {
        if catalogue.is_empty() {
            return Err(EngineError::configuration(
                "catalogue is empty; provide at least one question/answer pair",
            ));
        }

        let normalizer = Arc::new(TextNormalizer::new());
        let embedder = Arc::new(Embedder::new());
        let pipeline = MatchPipeline::build(
            normalizer.clone(),
            embedder.clone(),
            &catalogue.questions(),
            config.weights,
        )
        .map_err(|cause| EngineError::Configuration {
            message: "failed to build the initial indices".into(),
            source: Some(cause.into()),
        })?;

        tracing::info!(entries = catalogue.len(), "engine initialized");
        Ok(Self {
            state: RwLock::new(MatchState {
                catalogue,
                pipeline,
            }),
            config,
            normalizer,
            embedder,
            extractor,
            store,
        })
    }

    /// Engine with default config and no store/extractor — the shape most
    /// tests want.
    pub fn with_defaults(catalogue: Catalogue) -> Result<Self, EngineError> {
        Self::new(catalogue, EngineConfig::default(), None, None)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalogue_len(&self) -> usize {
        self.state.read().catalogue.len()
    }

    /// Answers one query. Never fails: every arm of the gate produces a
    /// [`MatchResult`].
    pub fn respond(&self, query: &str) -> MatchResult {
        let trimmed = query.trim();

        // EMPTY — recovered locally, never an error.
        if trimmed.is_empty() {
            return MatchResult {
                answer: VALIDATION_MESSAGE.to_string(),
                matched_question: None,
                confidence: 0.0,
            };
        }

        // EXIT — the surrounding loop stops on this; the comparison
        // contract (trimmed, case-insensitive) lives here so both shells
        // reproduce it identically.
        if self.is_exit(trimmed) {
            return MatchResult {
                answer: FAREWELL_MESSAGE.to_string(),
                matched_question: None,
                confidence: 0.0,
            };
        }

        let state = self.state.read();
        let hybrid = state.pipeline.match_query(trimmed);
        tracing::debug!(
            question = %hybrid.question,
            lexical = hybrid.lexical,
            semantic = hybrid.semantic,
            confidence = hybrid.confidence,
            "query matched"
        );

        // MATCHED — the winner's catalogue answer.
        if hybrid.confidence >= self.config.confidence_threshold {
            let answer = state
                .catalogue
                .get(hybrid.position)
                .map(|entry| entry.answer.clone())
                .unwrap_or_default();
            return MatchResult {
                answer,
                matched_question: Some(hybrid.question),
                confidence: hybrid.confidence,
            };
        }
        drop(state);

        // UNMATCHED — clarification, keeping the (low) confidence rather
        // than discarding it.
        MatchResult {
            answer: self.clarification(trimmed),
            matched_question: None,
            confidence: hybrid.confidence,
        }
    }

    /// True when the query is one of the configured exit keywords.
    pub fn is_exit(&self, query: &str) -> bool {
        let trimmed = query.trim();
        self.config
            .exit_keywords
            .iter()
            .any(|keyword| keyword.eq_ignore_ascii_case(trimmed))
    }

    /// Secondary keyword-overlap ranking for the UNMATCHED path: top 3
    /// catalogue questions with non-zero normalized-token overlap, ranked
    /// by `|common| / |question tokens|` descending.
    ///
    /// Questions whose normalized form is empty are excluded entirely —
    /// they are not scored as 0, they simply cannot be ranked.
    pub fn keyword_fallback(&self, query: &str) -> Vec<Suggestion> {
        // Same NFC pass as the match pipeline, so a query that matches
        // there can never miss here over a Unicode composition difference.
        let query: String = query.nfc().collect();
        let query_tokens: std::collections::HashSet<String> =
            self.normalizer.tokens(&query).into_iter().collect();

        let state = self.state.read();
        let mut suggestions: Vec<Suggestion> = state
            .catalogue
            .entries()
            .iter()
            .enumerate()
            .filter_map(|(position, entry)| {
                let question: String = entry.question.nfc().collect();
                let question_tokens: std::collections::HashSet<String> =
                    self.normalizer.tokens(&question).into_iter().collect();
                if question_tokens.is_empty() {
                    return None;
                }
                let common = question_tokens.intersection(&query_tokens).count();
                if common == 0 {
                    return None;
                }
                Some(Suggestion {
                    position,
                    question: entry.question.clone(),
                    overlap: common as f64 / question_tokens.len() as f64,
                })
            })
            .collect();

        suggestions.sort_by(|a, b| {
            b.overlap
                .partial_cmp(&a.overlap)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        suggestions.truncate(3);
        suggestions
    }

    /// The `(question, answer)` at a catalogue position — how the console
    /// loop resolves a picked suggestion.
    pub fn entry_at(&self, position: usize) -> Option<CatalogueEntry> {
        self.state.read().catalogue.get(position).cloned()
    }

    /// Appends a new pair and atomically swaps in freshly built indices.
    /// The new entry participates in every match after this returns.
    ///
    /// # Errors
    ///
    /// [`EngineError::IndexBuild`] if the rebuild fails; the prior indices
    /// stay active and the catalogue is unchanged. A failed save to the
    /// store is *not* an error: it comes back as the report's `warning`
    /// and the entry stays live in memory.
    pub fn add_entry(
        &self,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Result<AddReport, EngineError> {
        let question = question.into();
        let answer = answer.into();

        let snapshot = {
            let mut state = self.state.write();

            let mut questions = state.catalogue.questions();
            questions.push(question.clone());
            let pipeline = MatchPipeline::build(
                self.normalizer.clone(),
                self.embedder.clone(),
                &questions,
                self.config.weights,
            )
            .map_err(|cause| {
                EngineError::index_build("rebuilding indices for the new entry", cause)
            })?;

            // Rebuild succeeded: mutate and swap in one motion, still
            // under the write lock.
            state.catalogue.push(CatalogueEntry::new(question.clone(), answer));
            state.pipeline = pipeline;
            tracing::info!(question = %question, entries = state.catalogue.len(), "catalogue entry added, indices rebuilt");
            state.catalogue.clone()
        };

        // Persist outside the lock; failure is warning-level by contract.
        let Some(store) = &self.store else {
            return Ok(AddReport {
                persisted: false,
                warning: None,
            });
        };
        match store.save(&snapshot) {
            Ok(()) => Ok(AddReport {
                persisted: true,
                warning: None,
            }),
            Err(cause) => {
                tracing::warn!(error = %cause, "new entry is live in memory but could not be persisted");
                Ok(AddReport {
                    persisted: false,
                    warning: Some(EngineError::persistence(
                        "could not write the updated catalogue",
                        cause,
                    )),
                })
            }
        }
    }

    /// Clarification text for the UNMATCHED arm, enriched with extracted
    /// entities when an extractor is wired in and finds any.
    fn clarification(&self, query: &str) -> String {
        let entities = self
            .extractor
            .as_ref()
            .map(|extractor| extractor.extract(query))
            .unwrap_or_default();
        if entities.is_empty() {
            return CLARIFICATION_MESSAGE.to_string();
        }

        let mentioned = entities
            .iter()
            .map(|(label, span)| format!("{label}: {span}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "I'm not sure I understand your question fully. I noticed you mentioned {mentioned}. Could you rephrase your question?"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::default_catalogue;
    use crate::nlu::extractor::RegexEntityExtractor;

    /// The two-entry catalogue from the acceptance scenarios.
    fn small_catalogue() -> Catalogue {
        Catalogue::new(vec![
            CatalogueEntry::new("What is your return policy?", "30 days."),
            CatalogueEntry::new("How do I track my order?", "Use the tracking link."),
        ])
    }

    fn engine() -> FaqEngine {
        FaqEngine::with_defaults(small_catalogue()).unwrap()
    }

    // ─── gate arms ─────────────────────────────────────────────

    #[test]
    fn empty_and_whitespace_queries_return_the_validation_result() {
        let engine = engine();
        for query in ["", "   ", "\t\n"] {
            let result = engine.respond(query);
            assert_eq!(result.answer, VALIDATION_MESSAGE);
            assert_eq!(result.matched_question, None);
            assert_eq!(result.confidence, 0.0);
        }
    }

    #[test]
    fn exit_keywords_are_case_insensitive() {
        let engine = engine();
        for query in ["quit", "EXIT", "Bye", "  bye  "] {
            let result = engine.respond(query);
            assert_eq!(result.answer, FAREWELL_MESSAGE, "query: {query:?}");
            assert_eq!(result.matched_question, None);
        }
        assert!(engine.is_exit("QUIT"));
        assert!(!engine.is_exit("quite"));
    }

    #[test]
    fn exact_catalogue_question_clears_the_threshold() {
        let engine = engine();
        let result = engine.respond("What is your return policy?");
        assert_eq!(
            result.matched_question.as_deref(),
            Some("What is your return policy?")
        );
        assert_eq!(result.answer, "30 days.");
        assert!(result.confidence >= engine.config().confidence_threshold);
    }

    #[test]
    fn paraphrase_scenario_returns_the_return_policy_answer() {
        let engine = engine();
        let result = engine.respond("How do I send something back?");
        assert_eq!(
            result.matched_question.as_deref(),
            Some("What is your return policy?")
        );
        assert_eq!(result.answer, "30 days.");
        assert!(result.confidence > 0.3, "confidence: {}", result.confidence);
    }

    #[test]
    fn gibberish_stays_unmatched() {
        let engine = engine();
        let result = engine.respond("asdkjasdkj");
        assert_eq!(result.matched_question, None);
        assert!(result.confidence < engine.config().confidence_threshold);
        assert_eq!(result.answer, CLARIFICATION_MESSAGE);
    }

    #[test]
    fn stopword_only_query_has_confidence_zero_and_never_panics() {
        let engine = engine();
        for query in ["what is the", "?!...", "to be or not to be"] {
            let result = engine.respond(query);
            assert_eq!(result.confidence, 0.0, "query: {query:?}");
            assert_eq!(result.matched_question, None);
        }
    }

    #[test]
    fn responding_is_deterministic() {
        let engine = engine();
        let first = engine.respond("can I get my money back?");
        let second = engine.respond("can I get my money back?");
        assert_eq!(first, second);
    }

    // ─── catalogue growth ──────────────────────────────────────

    #[test]
    fn added_entry_matches_after_the_rebuild() {
        let engine = engine();
        let report = engine
            .add_entry("Do you offer gift wrapping?", "Yes, at checkout.")
            .unwrap();
        assert!(!report.persisted, "no store wired in");
        assert!(report.warning.is_none());

        let result = engine.respond("Do you offer gift wrapping?");
        assert_eq!(
            result.matched_question.as_deref(),
            Some("Do you offer gift wrapping?")
        );
        assert_eq!(result.answer, "Yes, at checkout.");
        assert!(result.confidence >= engine.config().confidence_threshold);
        assert_eq!(engine.catalogue_len(), 3);
    }

    #[test]
    fn add_entry_persists_through_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogueStore::new(dir.path().join("faq.json"));
        let engine = FaqEngine::new(
            small_catalogue(),
            EngineConfig::default(),
            Some(store.clone()),
            None,
        )
        .unwrap();

        let report = engine.add_entry("Do you ship abroad?", "Yes.").unwrap();
        assert!(report.persisted);

        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved.len(), 3);
        assert_eq!(saved.get(2).unwrap().question, "Do you ship abroad?");
    }

    #[test]
    fn failed_save_is_a_warning_and_the_entry_stays_live() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the target path makes every save fail.
        let path = dir.path().join("faq.json");
        std::fs::create_dir_all(&path).unwrap();
        let engine = FaqEngine::new(
            small_catalogue(),
            EngineConfig::default(),
            Some(CatalogueStore::new(&path)),
            None,
        )
        .unwrap();

        let report = engine.add_entry("Do you ship abroad?", "Yes.").unwrap();
        assert!(!report.persisted);
        assert!(matches!(
            report.warning,
            Some(EngineError::Persistence { .. })
        ));

        let result = engine.respond("Do you ship abroad?");
        assert_eq!(result.matched_question.as_deref(), Some("Do you ship abroad?"));
    }

    #[test]
    fn empty_catalogue_is_a_configuration_error() {
        let err = FaqEngine::with_defaults(Catalogue::default())
            .err()
            .expect("empty catalogue must fail");
        assert!(matches!(err, EngineError::Configuration { .. }));
    }

    // ─── keyword fallback ──────────────────────────────────────

    #[test]
    fn fallback_returns_at_most_three_with_nonzero_overlap() {
        let engine = FaqEngine::with_defaults(default_catalogue()).unwrap();
        let suggestions = engine.keyword_fallback("how do I return my order for a refund by shipping it back to support");
        assert!(suggestions.len() <= 3);
        for suggestion in &suggestions {
            assert!(suggestion.overlap > 0.0);
        }
    }

    #[test]
    fn fallback_ranks_by_overlap_ratio_descending() {
        let catalogue = Catalogue::new(vec![
            CatalogueEntry::new("return policy details", "a"),
            CatalogueEntry::new("return policy", "b"),
            CatalogueEntry::new("track order", "c"),
        ]);
        let engine = FaqEngine::with_defaults(catalogue).unwrap();
        let suggestions = engine.keyword_fallback("what is the return policy?");
        // 2/2 tokens covered beats 2/3 covered; zero-overlap entry is absent.
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].question, "return policy");
        assert_eq!(suggestions[1].question, "return policy details");
    }

    #[test]
    fn fallback_skips_questions_that_normalize_to_nothing() {
        let catalogue = Catalogue::new(vec![
            CatalogueEntry::new("???", "punctuation only"),
            CatalogueEntry::new("return policy", "b"),
        ]);
        let engine = FaqEngine::with_defaults(catalogue).unwrap();
        let suggestions = engine.keyword_fallback("return???");
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].question, "return policy");
    }

    #[test]
    fn fallback_with_no_overlap_is_empty() {
        let engine = engine();
        assert!(engine.keyword_fallback("zzqqy").is_empty());
    }

    #[test]
    fn fallback_treats_composed_and_decomposed_queries_alike() {
        let catalogue = Catalogue::new(vec![
            CatalogueEntry::new("Do you ship to Z\u{fc}rich?", "Yes."),
            CatalogueEntry::new("track order", "b"),
        ]);
        let engine = FaqEngine::with_defaults(catalogue).unwrap();

        let composed = engine.keyword_fallback("Z\u{fc}rich please");
        let decomposed = engine.keyword_fallback("Zu\u{308}rich please");
        assert_eq!(composed, decomposed);
        assert_eq!(composed.len(), 1);
        assert_eq!(composed[0].question, "Do you ship to Z\u{fc}rich?");
    }

    // ─── entity enrichment ─────────────────────────────────────

    #[test]
    fn unmatched_reply_mentions_extracted_entities() {
        let engine = FaqEngine::new(
            small_catalogue(),
            EngineConfig::default(),
            None,
            Some(Box::new(RegexEntityExtractor::new())),
        )
        .unwrap();

        let result = engine.respond("zzqqy on 2026-08-29 for $50");
        assert_eq!(result.matched_question, None);
        assert!(
            result.answer.contains("DATE: 2026-08-29"),
            "answer: {}",
            result.answer
        );
        assert!(result.answer.contains("MONEY: $50"));
    }

    #[test]
    fn entities_never_affect_a_confident_match() {
        let engine = FaqEngine::new(
            small_catalogue(),
            EngineConfig::default(),
            None,
            Some(Box::new(RegexEntityExtractor::new())),
        )
        .unwrap();
        let result = engine.respond("What is your return policy?");
        assert_eq!(result.answer, "30 days.");
    }
}
