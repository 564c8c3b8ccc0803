//! kbase-text
//!
//! BM25 retrieval over knowledge-base chunks: corpus statistics, the scorer,
//! a cached inverted index and the ingest/search entry points.
pub mod bm25;
pub mod index;
pub mod search;
pub mod stats;

pub use bm25::{bm25_search, Bm25Params, ScoredChunk};
pub use index::InvertedIndex;
pub use search::{ingest, search, KnowledgeBase, KnowledgeStats};
pub use stats::IndexStatistics;
