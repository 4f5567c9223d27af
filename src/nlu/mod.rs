//! # NLU Pipeline — From Raw Query to Ranked Best Match
//!
//! The [`MatchPipeline`] is the matching engine proper: it owns the frozen
//! lexical and semantic indices for one catalogue build and turns a raw
//! query into a [`HybridMatch`].
//!
//! ## Flow per query
//!
//! ```text
//! raw query
//!   ├── 1. NFC normalize (Unicode)
//!   ├── 2a. TextNormalizer → TfidfIndex::score     ┐ rayon::join —
//!   ├── 2b. SemanticIndex::score (raw text)        ┘ independent, read-only
//!   ├── 3. argmax per index (first occurrence on ties)
//!   ├── 4. winner: lexical iff max_lexical > max_semantic, else semantic
//!   └── 5. confidence: 0.4 · max_lexical + 0.6 · max_semantic
//! ```
//!
//! Step 4's strict `>` is deliberate: exact ties go to the semantic winner.
//! Step 5 blends the two *maxima*, which may come from different catalogue
//! items — the winner's identity and the confidence are computed
//! independently on purpose; preserve both rules together.
//!
//! ## Sub-modules
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`normalizer`] | deterministic text canonicalization |
//! | [`lexical`] | 1..=3-gram TF-IDF + cosine |
//! | [`semantic`] | dense embeddings + cosine (raw text, no normalizer) |
//! | [`extractor`] | enrichment-only entity extraction plug-in |

pub mod extractor;
pub mod lexical;
pub mod normalizer;
pub mod semantic;

use std::sync::Arc;

use anyhow::Result;
use unicode_normalization::UnicodeNormalization;

use lexical::TfidfIndex;
use normalizer::TextNormalizer;
use semantic::{Embedder, SemanticIndex};

/// Fixed blend weights for the hybrid confidence.
///
/// Tunable configuration, not derived: the semantic side carries more
/// weight because paraphrases are the common case in user queries.
#[derive(Debug, Clone, Copy)]
pub struct MatchWeights {
    pub lexical: f64,
    pub semantic: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            lexical: 0.4,
            semantic: 0.6,
        }
    }
}

/// Outcome of matching one query against one catalogue build.
#[derive(Debug, Clone, PartialEq)]
pub struct HybridMatch {
    /// Catalogue position of the winning question.
    pub position: usize,
    /// The winning question's text.
    pub question: String,
    /// Maximum lexical score over the catalogue.
    pub lexical: f64,
    /// Maximum semantic score over the catalogue.
    pub semantic: f64,
    /// Blended confidence in `[0, 1]`.
    pub confidence: f64,
}

/// Frozen per-build matching state: both indices plus the question texts
/// they were built from, all in lockstep by catalogue position.
///
/// A pipeline is immutable after [`build`](MatchPipeline::build); catalogue
/// growth replaces the whole pipeline (the engine's atomic swap), never
/// mutates one in place.
pub struct MatchPipeline {
    normalizer: Arc<TextNormalizer>,
    embedder: Arc<Embedder>,
    lexical: TfidfIndex,
    semantic: SemanticIndex,
    questions: Vec<String>,
    weights: MatchWeights,
}

impl MatchPipeline {
    /// Builds both indices over the catalogue questions.
    ///
    /// # Errors
    ///
    /// Fails on an empty question list — there is nothing to rank against,
    /// and every downstream argmax would be meaningless.
    pub fn build(
        normalizer: Arc<TextNormalizer>,
        embedder: Arc<Embedder>,
        questions: &[String],
        weights: MatchWeights,
    ) -> Result<Self> {
        anyhow::ensure!(
            !questions.is_empty(),
            "cannot build a match pipeline over an empty catalogue"
        );

        let questions: Vec<String> = questions
            .iter()
            .map(|q| q.nfc().collect::<String>())
            .collect();
        let normalized: Vec<String> = questions.iter().map(|q| normalizer.normalize(q)).collect();

        let lexical = TfidfIndex::fit(&normalized);
        let semantic = SemanticIndex::build(&embedder, &questions);
        tracing::debug!(
            lexical_rows = lexical.len(),
            semantic_rows = semantic.len(),
            "match pipeline built"
        );

        Ok(Self {
            normalizer,
            embedder,
            lexical,
            semantic,
            questions,
            weights,
        })
    }

    /// Scores a raw query against every catalogue position and reports the
    /// winner plus the blended confidence.
    ///
    /// Lexical and semantic scoring run concurrently; both are read-only
    /// over this frozen build and meet at the blend.
    pub fn match_query(&self, query: &str) -> HybridMatch {
        let query: String = query.nfc().collect();
        let normalized = self.normalizer.normalize(&query);

        let (lexical_scores, semantic_scores) = rayon::join(
            || self.lexical.score(&normalized),
            || self.semantic.score(&self.embedder, &query),
        );

        let (lexical_position, lexical_max) = argmax(&lexical_scores);
        let (semantic_position, semantic_max) = argmax(&semantic_scores);

        // Strict `>`: ties go to the semantic winner.
        let position = if lexical_max > semantic_max {
            lexical_position
        } else {
            semantic_position
        };

        HybridMatch {
            position,
            question: self.questions[position].clone(),
            lexical: lexical_max,
            semantic: semantic_max,
            confidence: self.weights.lexical * lexical_max + self.weights.semantic * semantic_max,
        }
    }
}

/// Position and value of the first maximum (ties resolve to the lowest
/// position). Callers guarantee non-empty input.
fn argmax(scores: &[f64]) -> (usize, f64) {
    let mut best_position = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (position, &value) in scores.iter().enumerate() {
        if value > best_value {
            best_position = position;
            best_value = value;
        }
    }
    (best_position, best_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline(questions: &[&str]) -> MatchPipeline {
        let texts: Vec<String> = questions.iter().map(|q| q.to_string()).collect();
        MatchPipeline::build(
            Arc::new(TextNormalizer::new()),
            Arc::new(Embedder::new()),
            &texts,
            MatchWeights::default(),
        )
        .expect("non-empty catalogue")
    }

    #[test]
    fn empty_catalogue_is_rejected() {
        let result = MatchPipeline::build(
            Arc::new(TextNormalizer::new()),
            Arc::new(Embedder::new()),
            &[],
            MatchWeights::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn exact_query_wins_with_full_confidence() {
        let p = pipeline(&["What is your return policy?", "How do I track my order?"]);
        let m = p.match_query("What is your return policy?");
        assert_eq!(m.position, 0);
        assert!(m.confidence > 0.99, "match: {m:?}");
    }

    #[test]
    fn paraphrase_is_carried_by_the_semantic_side() {
        let p = pipeline(&["What is your return policy?", "How do I track my order?"]);
        let m = p.match_query("How do I send something back?");
        assert_eq!(m.question, "What is your return policy?");
        assert_eq!(m.lexical, 0.0, "no normalized token overlap");
        assert!(m.semantic > 0.5);
        assert!(m.confidence >= 0.4, "match: {m:?}");
    }

    #[test]
    fn lexical_side_wins_when_strictly_greater() {
        // Same normalized form (lexical 1.0) but different raw word forms,
        // so the semantic score stays well below it.
        let p = pipeline(&["warranty coverages detail?", "How do I send something back?"]);
        let m = p.match_query("warranty coverage details");
        assert_eq!(m.question, "warranty coverages detail?");
        assert!(m.lexical > 0.99);
        assert!(m.semantic < 0.9);
    }

    #[test]
    fn all_zero_scores_tie_to_the_semantic_argmax() {
        let p = pipeline(&["What is your return policy?", "How do I track my order?"]);
        let m = p.match_query("zzqqy");
        assert_eq!(m.position, 0, "first position on an all-zero tie");
        assert_eq!(m.confidence, 0.0);
    }

    #[test]
    fn matching_is_deterministic() {
        let p = pipeline(&["What is your return policy?", "How do I track my order?"]);
        let first = p.match_query("can I send my order back?");
        let second = p.match_query("can I send my order back?");
        assert_eq!(first, second);
    }

    #[test]
    fn argmax_returns_first_occurrence_of_the_maximum() {
        assert_eq!(argmax(&[0.2, 0.7, 0.7, 0.1]), (1, 0.7));
        assert_eq!(argmax(&[0.0, 0.0]), (0, 0.0));
    }
}
