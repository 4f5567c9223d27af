//! # Lexical Similarity Index — N-gram TF-IDF + Cosine
//!
//! Term-weighted vector space over the *normalized* catalogue questions,
//! using word n-grams of length 1 to 3 so short phrases ("return policy",
//! "track my order") match as units, not just bags of words.
//!
//! The vocabulary is fitted once per build and frozen: at query time unseen
//! terms contribute zero weight and the vocabulary never grows. Rebuilding
//! from identical text yields identical vectors.
//!
//! IDF uses the smoothed form `ln((1 + n) / (1 + df)) + 1` and every vector
//! is L2-normalized, so cosine similarity reduces to a dot product. A zero
//! vector (empty normalized text) scores 0 against everything, never NaN.

use std::collections::HashMap;

/// Fitted TF-IDF vector space over the catalogue questions.
///
/// One weighted, L2-normalized vector per catalogue position; position `i`
/// always refers to catalogue entry `i` of the build it came from.
pub struct TfidfIndex {
    /// N-gram to feature index mapping, frozen at build time.
    vocabulary: HashMap<String, usize>,
    /// Smoothed inverse document frequency per feature.
    idf: Vec<f64>,
    /// L2-normalized TF-IDF vector per catalogue question.
    question_vectors: Vec<Vec<f64>>,
}

impl TfidfIndex {
    /// Fits the vocabulary and question vectors over already-normalized
    /// question texts (one per catalogue position, duplicates included —
    /// dedup is the semantic index's concern, not this one's).
    pub fn fit(normalized_questions: &[String]) -> Self {
        let mut vocabulary = HashMap::new();
        let mut document_frequency: Vec<usize> = Vec::new();

        let question_grams: Vec<Vec<String>> = normalized_questions
            .iter()
            .map(|text| ngrams(text))
            .collect();

        for grams in &question_grams {
            let mut seen = std::collections::HashSet::new();
            for gram in grams {
                if seen.insert(gram.as_str()) {
                    let next_index = vocabulary.len();
                    let index = *vocabulary.entry(gram.clone()).or_insert(next_index);
                    if index == document_frequency.len() {
                        document_frequency.push(0);
                    }
                    document_frequency[index] += 1;
                }
            }
        }

        let doc_count = normalized_questions.len() as f64;
        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|&df| ((1.0 + doc_count) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let question_vectors = question_grams
            .iter()
            .map(|grams| weighted_vector(grams, &vocabulary, &idf))
            .collect();

        Self {
            vocabulary,
            idf,
            question_vectors,
        }
    }

    /// Cosine similarity of an already-normalized query against every
    /// catalogue position, in catalogue order.
    pub fn score(&self, normalized_query: &str) -> Vec<f64> {
        let query_vector = weighted_vector(&ngrams(normalized_query), &self.vocabulary, &self.idf);
        self.question_vectors
            .iter()
            .map(|question_vector| dot(&query_vector, question_vector))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.question_vectors.len()
    }
}

/// Word n-grams of length 1..=3 over a space-joined token string.
fn ngrams(normalized_text: &str) -> Vec<String> {
    let tokens: Vec<&str> = normalized_text.split_whitespace().collect();
    let mut grams = Vec::with_capacity(tokens.len() * 3);
    for n in 1..=3usize {
        if tokens.len() < n {
            break;
        }
        for window in tokens.windows(n) {
            grams.push(window.join(" "));
        }
    }
    grams
}

/// TF-IDF vector for one document, L2-normalized. Grams outside the fitted
/// vocabulary are skipped (zero weight).
fn weighted_vector(grams: &[String], vocabulary: &HashMap<String, usize>, idf: &[f64]) -> Vec<f64> {
    let mut vector = vec![0.0; idf.len()];
    for gram in grams {
        if let Some(&index) = vocabulary.get(gram) {
            vector[index] += 1.0;
        }
    }
    for (value, weight) in vector.iter_mut().zip(idf.iter()) {
        *value *= weight;
    }

    let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for value in &mut vector {
            *value /= norm;
        }
    }
    vector
}

/// Dot product of two equally-sized vectors; since both sides are
/// L2-normalized (or zero), this is cosine similarity with the zero-vector
/// case already pinned to 0.
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
