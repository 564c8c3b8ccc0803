//! Corpus statistics needed by BM25: chunk count, average token length and
//! document frequency per term.

use std::collections::{HashMap, HashSet};

use kbase_core::tokenize::tokenize;
use kbase_core::types::Chunk;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexStatistics {
    /// Number of chunks in the corpus (N).
    pub chunk_count: usize,
    /// Mean token count per chunk; 0 for an empty corpus.
    pub avg_chunk_len: f64,
    /// Number of chunks containing each term at least once.
    pub doc_freq: HashMap<String, usize>,
}

impl IndexStatistics {
    /// Statistics over the whole corpus, with df for every term seen.
    pub fn compute(corpus: &[Chunk]) -> Self {
        Self::build(corpus, None)
    }

    /// Like [`compute`](Self::compute) but df is only tracked for `terms`.
    /// N and the average length still cover the full corpus.
    pub fn compute_for_terms<'a, I>(corpus: &[Chunk], terms: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let wanted: HashSet<&str> = terms.into_iter().collect();
        Self::build(corpus, Some(&wanted))
    }

    fn build(corpus: &[Chunk], wanted: Option<&HashSet<&str>>) -> Self {
        let mut total_len = 0usize;
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for chunk in corpus {
            let tokens = tokenize(&chunk.content);
            total_len += tokens.len();
            let unique: HashSet<&str> = tokens.iter().collect();
            for term in unique {
                if wanted.is_some_and(|w| !w.contains(term)) {
                    continue;
                }
                *doc_freq.entry(term.to_string()).or_insert(0) += 1;
            }
        }

        Self {
            chunk_count: corpus.len(),
            avg_chunk_len: average(total_len, corpus.len()),
            doc_freq,
        }
    }

    pub fn df(&self, term: &str) -> usize {
        self.doc_freq.get(term).copied().unwrap_or(0)
    }
}

/// `total / count`, where an empty corpus divides by 1.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn average(total: usize, count: usize) -> f64 {
    total as f64 / count.max(1) as f64
}
