//! Precomputed inverted index over a chunk corpus.
//!
//! Holds term postings, chunk lengths and document frequencies so a query
//! only touches chunks that share a term with it. Rankings and scores are
//! bit-identical to [`crate::bm25::bm25_search_with`] over the same chunks
//! in the same order.

use std::collections::HashMap;

use tracing::debug;

use kbase_core::tokenize::tokenize;
use kbase_core::types::Chunk;

use crate::bm25::{finish, Bm25Params, ScoredChunk};
use crate::stats::average;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Posting {
    slot: usize,
    term_frequency: usize,
}

#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    chunks: Vec<Chunk>,
    postings: HashMap<String, Vec<Posting>>,
    chunk_lengths: Vec<usize>,
    total_length: usize,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_chunks(chunks: impl IntoIterator<Item = Chunk>) -> Self {
        let mut index = Self::new();
        index.extend(chunks);
        index
    }

    pub fn extend(&mut self, chunks: impl IntoIterator<Item = Chunk>) {
        for chunk in chunks {
            self.add(chunk);
        }
    }

    pub fn add(&mut self, chunk: Chunk) {
        let slot = self.chunks.len();
        let tokens = tokenize(&chunk.content);
        let mut tf: HashMap<&str, usize> = HashMap::new();
        for token in tokens.iter() {
            *tf.entry(token).or_insert(0) += 1;
        }
        for (term, term_frequency) in tf {
            self.postings
                .entry(term.to_string())
                .or_default()
                .push(Posting { slot, term_frequency });
        }
        self.chunk_lengths.push(tokens.len());
        self.total_length += tokens.len();
        self.chunks.push(chunk);
    }

    /// Drops every chunk of `document_id`, keeping the others in order.
    /// Returns the number of chunks removed.
    pub fn remove_document(&mut self, document_id: &str) -> usize {
        let before = self.chunks.len();
        let kept: Vec<Chunk> = std::mem::take(&mut self.chunks)
            .into_iter()
            .filter(|c| c.document_id != document_id)
            .collect();
        let removed = before - kept.len();
        if removed > 0 {
            *self = Self::from_chunks(kept);
        } else {
            self.chunks = kept;
        }
        removed
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn average_chunk_length(&self) -> f64 {
        average(self.total_length, self.chunks.len())
    }

    pub fn doc_freq(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, Vec::len)
    }

    pub fn search(&self, query: &str, limit: usize) -> Vec<ScoredChunk<'_>> {
        self.search_with(query, limit, Bm25Params::default())
    }

    pub fn search_with(&self, query: &str, limit: usize, params: Bm25Params) -> Vec<ScoredChunk<'_>> {
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() || self.chunks.is_empty() || limit == 0 {
            return Vec::new();
        }

        #[allow(clippy::cast_precision_loss)]
        let n = self.chunks.len() as f64;
        let avg_dl = self.average_chunk_length();
        let mut scores: Vec<Option<f64>> = vec![None; self.chunks.len()];

        // Query-term order matches the full scan, so per-chunk sums are
        // accumulated in the same order.
        for term in query_tokens.iter() {
            let Some(postings) = self.postings.get(term) else { continue };
            #[allow(clippy::cast_precision_loss)]
            let df = postings.len() as f64;
            for posting in postings {
                #[allow(clippy::cast_precision_loss)]
                let (tf, dl) = (posting.term_frequency as f64, self.chunk_lengths[posting.slot] as f64);
                let contribution = params.term_score(tf, df, n, dl, avg_dl);
                *scores[posting.slot].get_or_insert(0.0) += contribution;
            }
        }

        let scored: Vec<ScoredChunk<'_>> = scores
            .into_iter()
            .zip(&self.chunks)
            .filter_map(|(score, chunk)| score.filter(|s| *s > 0.0).map(|score| ScoredChunk { chunk, score }))
            .collect();
        debug!(terms = query_tokens.len(), corpus = self.chunks.len(), matched = scored.len(), "indexed bm25 search");
        finish(scored, limit)
    }
}
