//! BM25 Okapi scoring over a corpus snapshot.
//!
//! Statistics are recomputed from the corpus on every call; see
//! [`crate::index::InvertedIndex`] for a precomputed variant with identical
//! output.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use kbase_core::config::{RetrievalSettings, BM25_B, BM25_K1};
use kbase_core::tokenize::tokenize;
use kbase_core::traits::DocumentNames;
use kbase_core::types::{round_score, Chunk, ScoredResult, UNKNOWN_DOCUMENT};

use crate::stats::IndexStatistics;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: BM25_K1, b: BM25_B }
    }
}

impl From<&RetrievalSettings> for Bm25Params {
    fn from(settings: &RetrievalSettings) -> Self {
        Self { k1: settings.k1, b: settings.b }
    }
}

impl Bm25Params {
    /// Contribution of one query term to one chunk's score.
    pub fn term_score(&self, tf: f64, df: f64, n: f64, dl: f64, avg_dl: f64) -> f64 {
        let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
        let tf_norm = (tf * (self.k1 + 1.0)) / (tf + self.k1 * (1.0 - self.b + self.b * dl / avg_dl));
        idf * tf_norm
    }
}

/// A chunk paired with its full-precision relevance score.
#[derive(Debug, Clone, Copy)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a Chunk,
    pub score: f64,
}

impl ScoredChunk<'_> {
    /// Converts to the caller-facing shape: name resolved, score rounded.
    pub fn present<N: DocumentNames + ?Sized>(&self, names: &N) -> ScoredResult {
        ScoredResult {
            chunk_id: self.chunk.id.clone(),
            document_id: self.chunk.document_id.clone(),
            document_name: names
                .document_name(&self.chunk.document_id)
                .unwrap_or(UNKNOWN_DOCUMENT)
                .to_string(),
            content: self.chunk.content.clone(),
            score: round_score(self.score),
            position: self.chunk.position,
        }
    }
}

/// Descending score, then ascending position. Callers sort stably so that
/// full ties keep corpus order.
pub(crate) fn rank_order(a: &ScoredChunk<'_>, b: &ScoredChunk<'_>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.chunk.position.cmp(&b.chunk.position))
}

pub(crate) fn finish(mut scored: Vec<ScoredChunk<'_>>, limit: usize) -> Vec<ScoredChunk<'_>> {
    scored.sort_by(rank_order);
    scored.truncate(limit);
    scored
}

/// Ranks `corpus` against `query` with the standard constants.
pub fn bm25_search<'a>(query: &str, corpus: &'a [Chunk], limit: usize) -> Vec<ScoredChunk<'a>> {
    bm25_search_with(query, corpus, limit, Bm25Params::default())
}

/// Returns at most `limit` chunks scoring above zero, best first.
pub fn bm25_search_with<'a>(
    query: &str,
    corpus: &'a [Chunk],
    limit: usize,
    params: Bm25Params,
) -> Vec<ScoredChunk<'a>> {
    let query_tokens = tokenize(query);
    if query_tokens.is_empty() || corpus.is_empty() || limit == 0 {
        return Vec::new();
    }

    let stats = IndexStatistics::compute_for_terms(corpus, query_tokens.iter());
    #[allow(clippy::cast_precision_loss)]
    let n = stats.chunk_count as f64;

    let mut scored = Vec::new();
    for chunk in corpus {
        let tokens = tokenize(&chunk.content);
        let mut tf: HashMap<&str, usize> = HashMap::new();
        for token in tokens.iter() {
            *tf.entry(token).or_insert(0) += 1;
        }
        #[allow(clippy::cast_precision_loss)]
        let dl = tokens.len() as f64;

        // Repeated query terms contribute once per occurrence.
        let mut score = 0.0;
        for term in query_tokens.iter() {
            let Some(&count) = tf.get(term) else { continue };
            #[allow(clippy::cast_precision_loss)]
            let (term_tf, df) = (count as f64, stats.df(term) as f64);
            score += params.term_score(term_tf, df, n, dl, stats.avg_chunk_len);
        }
        if score > 0.0 {
            scored.push(ScoredChunk { chunk, score });
        }
    }

    debug!(terms = query_tokens.len(), corpus = corpus.len(), matched = scored.len(), "bm25 search");
    finish(scored, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(contents: &[&str]) -> Vec<Chunk> {
        contents
            .iter()
            .enumerate()
            .map(|(i, c)| Chunk {
                id: format!("c{i}"),
                document_id: "doc".into(),
                position: i,
                content: (*c).to_string(),
                keywords: vec![],
            })
            .collect()
    }

    #[test]
    fn empty_query_returns_nothing() {
        let chunks = corpus(&["rust programming", "python scripting"]);
        assert!(bm25_search("", &chunks, 5).is_empty());
        assert!(bm25_search("   ", &chunks, 5).is_empty());
        assert!(bm25_search("the of and", &chunks, 5).is_empty());
    }

    #[test]
    fn empty_corpus_returns_nothing() {
        assert!(bm25_search("rust", &[], 5).is_empty());
    }

    #[test]
    fn zero_limit_returns_nothing() {
        let chunks = corpus(&["rust programming"]);
        assert!(bm25_search("rust", &chunks, 0).is_empty());
    }

    #[test]
    fn non_matching_chunk_excluded() {
        let chunks = corpus(&["the cat sat on the mat", "dogs bark loudly at night"]);
        let results = bm25_search("cat mat", &chunks, 5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.id, "c0");
        assert!(results[0].score > 0.0);
        assert!((results[0].score - 1.481_535_958_448_738).abs() < 1e-9);
    }

    #[test]
    fn higher_term_frequency_ranks_first() {
        let chunks = corpus(&["rust programming", "rust rust rust"]);
        let results = bm25_search("rust", &chunks, 10);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.id, "c1");
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn equal_scores_break_ties_by_position() {
        let mut chunks = corpus(&["shared words here", "shared words here", "other text"]);
        chunks[0].position = 7;
        chunks[1].position = 2;
        let results = bm25_search("shared", &chunks, 5);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].score, results[1].score);
        assert_eq!(results[0].chunk.position, 2);
        assert_eq!(results[1].chunk.position, 7);
    }

    #[test]
    fn limit_truncates() {
        let chunks = corpus(&["rust one", "rust two", "rust three", "python"]);
        assert_eq!(bm25_search("rust", &chunks, 2).len(), 2);
        assert_eq!(bm25_search("rust", &chunks, 10).len(), 3);
    }

    #[test]
    fn repeated_query_terms_count_twice() {
        let chunks = corpus(&["rust cargo", "python pip"]);
        let once = bm25_search("rust", &chunks, 5)[0].score;
        let twice = bm25_search("rust rust", &chunks, 5)[0].score;
        assert!((twice - 2.0 * once).abs() < 1e-12);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let chunks = corpus(&["alpha beta gamma", "beta gamma delta", "gamma delta epsilon"]);
        let a: Vec<(String, u64)> =
            bm25_search("gamma beta", &chunks, 5).iter().map(|s| (s.chunk.id.clone(), s.score.to_bits())).collect();
        let b: Vec<(String, u64)> =
            bm25_search("gamma beta", &chunks, 5).iter().map(|s| (s.chunk.id.clone(), s.score.to_bits())).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn present_rounds_and_resolves_names() {
        let chunks = corpus(&["the cat sat on the mat"]);
        let names: HashMap<String, String> = HashMap::from([("doc".to_string(), "Pets".to_string())]);
        let hit = bm25_search("cat mat", &chunks, 5)[0];
        let shown = hit.present(&names);
        assert_eq!(shown.document_name, "Pets");
        assert_eq!(shown.score, round_score(hit.score));
        assert_eq!(shown.chunk_id, "c0");

        let unknown = hit.present(&HashMap::<String, String>::new());
        assert_eq!(unknown.document_name, UNKNOWN_DOCUMENT);
    }
}
