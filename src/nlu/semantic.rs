//! # Semantic Similarity Index — Dense Embeddings + Cosine
//!
//! Embeds each catalogue question and the query into a fixed-size dense
//! vector and scores by cosine similarity. Unlike the lexical index, this
//! one works on the **raw** question/query text — it never runs the
//! [`TextNormalizer`](super::normalizer::TextNormalizer). That asymmetry is
//! deliberate and load-bearing: it changes matching behavior and must not
//! be "fixed".
//!
//! ## Local embedding backend
//!
//! No network model. A document embedding is the weighted sum of per-token
//! vectors, L2-normalized:
//!
//! | Token class | Vector | Weight |
//! |-------------|--------|--------|
//! | function word | skipped | — |
//! | synonym-lexicon member | its cluster's reserved unit axis | 1.0 |
//! | anything else | 8-feature random-indexing vector | 0.25 |
//!
//! Cluster axes live in a reserved block of dimensions, so two different
//! clusters are exactly orthogonal and lexicon arithmetic is exact; hashed
//! tokens land in the remaining dimensions, seeded from a stable token hash
//! (same process-independent construction every run, every rebuild).
//!
//! The synonym lexicon is what makes paraphrases land near each other:
//! "send it back" and "return" share the returns axis even with zero
//! token overlap.
//!
//! ## Degenerate inputs
//!
//! A text with no recognized tokens (empty, punctuation, function words
//! only) embeds to the zero vector, and cosine against a zero vector is
//! defined as 0 — never NaN, never an error.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::normalizer::STOPWORDS;

/// Embedding width. The first [`RESERVED_DIMS`] dimensions are cluster
/// axes; the rest receive hashed tokens.
pub const EMBEDDING_DIM: usize = 256;
const RESERVED_DIMS: usize = 32;
const FEATURES_PER_TOKEN: usize = 8;

const CLUSTER_WEIGHT: f32 = 1.0;
const GENERIC_WEIGHT: f32 = 0.25;

/// Function words the embedder skips entirely.
///
/// This is the embedder's own filter (the counterpart of the vectorizer's
/// built-in English list in classic TF-IDF stacks), *not* the normalizer
/// pipeline: it extends the shared stopword list with indefinite pronouns
/// and modals that carry no topical signal.
const EXTRA_FUNCTION_WORDS: &[&str] = &[
    "something", "anything", "everything", "nothing", "someone", "anyone", "everyone",
    "somebody", "anybody", "everybody", "would", "could", "may", "might", "must", "shall",
    "us", "let", "please", "also", "get", "got", "want", "need", "like",
];

/// Topical synonym clusters. Tokens in the same cluster share one axis,
/// which is how "refund", "send", "back" all pull toward "return policy".
const SYNONYM_CLUSTERS: &[(&str, &[&str])] = &[
    (
        "returns",
        &[
            "return", "returns", "returned", "refund", "refunds", "refunded", "exchange",
            "exchanged", "send", "sent", "back", "money",
        ],
    ),
    (
        "orders",
        &[
            "order", "orders", "track", "tracking", "package", "parcel", "shipment", "status",
        ],
    ),
    (
        "shipping",
        &[
            "ship", "shipping", "shipped", "delivery", "deliver", "delivered", "carrier",
            "carriers", "arrive", "arrival",
        ],
    ),
    (
        "payments",
        &[
            "pay", "payment", "payments", "paid", "card", "cards", "paypal", "billing",
            "method", "methods", "accept",
        ],
    ),
    (
        "support",
        &["support", "contact", "help", "email", "phone", "customer", "service", "agent"],
    ),
    ("policy", &["policy", "policies", "terms", "conditions", "rules"]),
    (
        "account",
        &["account", "login", "password", "sign", "register", "profile"],
    ),
    (
        "discounts",
        &["discount", "discounts", "coupon", "coupons", "promo", "voucher", "sale"],
    ),
];

/// Deterministic text embedder: synonym lexicon + random-indexing fallback.
///
/// Immutable after construction and cheap to build — all static resources
/// are compiled in, so engine startup cannot fail on a missing model.
pub struct Embedder {
    /// token → cluster axis (a reserved dimension index).
    lexicon: HashMap<&'static str, usize>,
}

impl Embedder {
    pub fn new() -> Self {
        let mut lexicon = HashMap::new();
        debug_assert!(SYNONYM_CLUSTERS.len() <= RESERVED_DIMS);
        for (axis, (_, members)) in SYNONYM_CLUSTERS.iter().enumerate() {
            for member in *members {
                lexicon.insert(*member, axis);
            }
        }
        Self { lexicon }
    }

    /// Embeds raw text into an L2-normalized [`EMBEDDING_DIM`]-wide vector.
    /// Texts with no recognized tokens produce the zero vector.
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; EMBEDDING_DIM];

        for token in tokenize(text) {
            if is_function_word(&token) {
                continue;
            }
            if let Some(&axis) = self.lexicon.get(token.as_str()) {
                vector[axis] += CLUSTER_WEIGHT;
            } else {
                add_hashed_token(&mut vector, &token, GENERIC_WEIGHT);
            }
        }

        l2_normalize(&mut vector);
        vector
    }
}

impl Default for Embedder {
    fn default() -> Self {
        Self::new()
    }
}

/// Embeddings over the de-duplicated catalogue questions, with the mapping
/// back to original catalogue positions.
pub struct SemanticIndex {
    /// One embedding per unique question text.
    embeddings: Vec<Vec<f32>>,
    /// Catalogue position → index into `embeddings` (duplicates share one).
    position_to_unique: Vec<usize>,
}

impl SemanticIndex {
    /// Builds the index over raw question texts. Duplicate questions
    /// (case-sensitive exact match) are embedded once and shared.
    pub fn build(embedder: &Embedder, questions: &[String]) -> Self {
        let mut unique: HashMap<&str, usize> = HashMap::new();
        let mut embeddings = Vec::new();
        let mut position_to_unique = Vec::with_capacity(questions.len());

        for question in questions {
            let index = *unique.entry(question.as_str()).or_insert_with(|| {
                embeddings.push(embedder.embed(question));
                embeddings.len() - 1
            });
            position_to_unique.push(index);
        }

        Self {
            embeddings,
            position_to_unique,
        }
    }

    /// Cosine similarity of the raw query against every catalogue position,
    /// in catalogue order (duplicates report the shared embedding's score).
    pub fn score(&self, embedder: &Embedder, query: &str) -> Vec<f64> {
        let query_embedding = embedder.embed(query);
        self.position_to_unique
            .iter()
            .map(|&unique_index| {
                f64::from(cosine_similarity(
                    &query_embedding,
                    &self.embeddings[unique_index],
                ))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.position_to_unique.len()
    }
}

/// Cosine similarity with the zero-vector case pinned to 0, never NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;
    for i in 0..a.len() {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    dot / denom
}

fn is_function_word(token: &str) -> bool {
    STOPWORDS.contains(&token) || EXTRA_FUNCTION_WORDS.contains(&token)
}

/// Lowercased alphanumeric tokens of the raw text. No stopword removal, no
/// lemmatization — that is the lexical pipeline's job, not this one's.
fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|token| !token.is_empty())
        .collect()
}

/// Adds a token's random-indexing vector: [`FEATURES_PER_TOKEN`] signed
/// hits in the non-reserved dimensions, unit-normalized, then scaled.
fn add_hashed_token(vector: &mut [f32], token: &str, weight: f32) {
    let span = EMBEDDING_DIM - RESERVED_DIMS;
    let mut features = vec![0.0_f32; span];
    let mut state = stable_hash(token);

    for _ in 0..FEATURES_PER_TOKEN {
        state = split_mix(state);
        let index = (state as usize) % span;
        let sign = if (state >> 63) & 1 == 0 { 1.0 } else { -1.0 };
        features[index] += sign;
    }

    let norm = features.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for (i, feature) in features.iter().enumerate() {
        vector[RESERVED_DIMS + i] += weight * feature / norm;
    }
}

fn stable_hash(value: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// SplitMix64 step — a tiny deterministic PRNG for spreading one token
/// hash over several dimensions.
fn split_mix(state: u64) -> u64 {
    let mut z = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for value in vector.iter_mut() {
        *value /= norm;
    }
}
