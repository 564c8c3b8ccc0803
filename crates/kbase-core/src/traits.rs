use std::collections::HashMap;

use crate::error::Result;
use crate::types::{Document, NewDocument, ScoredResult};

/// Resolves a document id to its display name for search presentation.
pub trait DocumentNames {
    fn document_name(&self, document_id: &str) -> Option<&str>;
}

impl DocumentNames for HashMap<String, String> {
    fn document_name(&self, document_id: &str) -> Option<&str> {
        self.get(document_id).map(String::as_str)
    }
}

/// A knowledge base that owns documents and their chunks.
pub trait SearchEngine: Send + Sync {
    /// Registers a document and all of its chunks, or nothing on failure.
    fn ingest(&mut self, document: NewDocument) -> Result<Document>;
    /// Removes a document together with every chunk it owns.
    fn remove(&mut self, document_id: &str) -> Result<Document>;
    fn query(&self, query: &str, k: usize) -> Result<Vec<ScoredResult>>;
}
