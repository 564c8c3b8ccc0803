//! Retrieval API: text in, chunks with keywords out; query in, ranked
//! chunks out. Plus [`KnowledgeBase`], an in-memory owner of documents and
//! chunks that assigns ids and keeps deletes atomic.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use kbase_core::chunker::{Chunker, ChunkingConfig};
use kbase_core::config::RetrievalSettings;
use kbase_core::error::{Error, Result};
use kbase_core::keywords::extract_top_keywords;
use kbase_core::traits::{DocumentNames, SearchEngine};
use kbase_core::types::{
    Chunk, ChunkDraft, Document, NewDocument, ScoredResult, SearchRequest, DEFAULT_CATEGORY,
};

use crate::bm25::{bm25_search_with, Bm25Params, ScoredChunk};
use crate::index::InvertedIndex;

/// Chunks `text` and attaches keywords to each chunk. `chunk_size` overrides
/// the default of 500 characters and must be non-zero.
pub fn ingest(text: &str, chunk_size: Option<usize>) -> Result<Vec<ChunkDraft>> {
    ingest_with(text, chunk_size, &RetrievalSettings::default())
}

pub fn ingest_with(text: &str, chunk_size: Option<usize>, settings: &RetrievalSettings) -> Result<Vec<ChunkDraft>> {
    let config = ChunkingConfig::new(chunk_size.unwrap_or(settings.chunk_size))?;
    let drafts: Vec<ChunkDraft> = Chunker::new(config)
        .chunk(text)
        .into_iter()
        .map(|c| ChunkDraft {
            keywords: extract_top_keywords(&c.content, settings.max_keywords),
            content: c.content,
            position: c.position,
        })
        .collect();
    debug!(chunk_size = config.chunk_size, chunks = drafts.len(), "ingested text");
    Ok(drafts)
}

/// Ranks a corpus snapshot against `query`; the corpus is never modified.
pub fn search<'a>(query: &str, corpus: &'a [Chunk], limit: usize) -> Vec<ScoredChunk<'a>> {
    bm25_search_with(query, corpus, limit, Bm25Params::default())
}

/// Boundary form of [`search`]: clamps the request limit and resolves
/// document names.
pub fn search_request<N: DocumentNames + ?Sized>(
    request: &SearchRequest,
    corpus: &[Chunk],
    names: &N,
    settings: &RetrievalSettings,
) -> Vec<ScoredResult> {
    let limit = request.effective_limit(settings.default_limit);
    bm25_search_with(&request.query, corpus, limit, Bm25Params::from(settings))
        .iter()
        .map(|hit| hit.present(names))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeStats {
    pub documents: usize,
    pub chunks: usize,
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    settings: RetrievalSettings,
    documents: Vec<Document>,
    index: InvertedIndex,
    sequence: u64,
}

impl KnowledgeBase {
    pub fn new(settings: RetrievalSettings) -> Self {
        Self { settings, ..Self::default() }
    }

    /// Registers a document and its chunks together. Nothing is stored if
    /// any step fails.
    pub fn add_document(&mut self, new: NewDocument) -> Result<Document> {
        let name = new.display_name();
        let drafts = ingest_with(&new.text, new.chunk_size, &self.settings)?;

        let id = self.next_document_id(&new.filename);
        let document = Document {
            id: id.clone(),
            name,
            source_type: new.source_type(),
            category: new
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            tags: new.tags.iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect(),
            chunk_count: drafts.len(),
            size: new.text.len(),
            ingested_at: Utc::now(),
            filename: new.filename,
        };

        self.index.extend(drafts.into_iter().map(|d| {
            let chunk_id = format!("{}:{}", id, d.position);
            d.into_chunk(chunk_id, id.clone())
        }));
        self.documents.push(document.clone());
        info!(id = %document.id, name = %document.name, chunks = document.chunk_count, "document ingested");
        Ok(document)
    }

    /// Deletes a document and every chunk it owns.
    pub fn remove_document(&mut self, document_id: &str) -> Result<Document> {
        let slot = self
            .documents
            .iter()
            .position(|d| d.id == document_id)
            .ok_or_else(|| Error::NotFound(format!("document {document_id}")))?;
        let removed_chunks = self.index.remove_document(document_id);
        let document = self.documents.remove(slot);
        info!(id = %document.id, chunks = removed_chunks, "document removed");
        Ok(document)
    }

    pub fn document(&self, document_id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == document_id)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// The current corpus snapshot.
    pub fn chunks(&self) -> &[Chunk] {
        self.index.chunks()
    }

    pub fn document_chunks(&self, document_id: &str) -> Vec<&Chunk> {
        let mut chunks: Vec<&Chunk> = self.chunks().iter().filter(|c| c.document_id == document_id).collect();
        chunks.sort_by_key(|c| c.position);
        chunks
    }

    /// Reassembles a document's text from its chunks, in position order,
    /// separated by blank lines.
    pub fn document_content(&self, document_id: &str) -> Result<String> {
        if self.document(document_id).is_none() {
            return Err(Error::NotFound(format!("document {document_id}")));
        }
        Ok(self
            .document_chunks(document_id)
            .iter()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n"))
    }

    pub fn stats(&self) -> KnowledgeStats {
        KnowledgeStats { documents: self.documents.len(), chunks: self.index.len() }
    }

    pub fn search(&self, query: &str, limit: usize) -> Vec<ScoredResult> {
        self.index
            .search_with(query, limit, Bm25Params::from(&self.settings))
            .iter()
            .map(|hit| hit.present(self))
            .collect()
    }

    fn next_document_id(&mut self, filename: &str) -> String {
        self.sequence += 1;
        let seed = format!(
            "{}:{}:{}",
            self.sequence,
            filename,
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        );
        let mut id = blake3::hash(seed.as_bytes()).to_hex().to_string();
        id.truncate(12);
        id
    }
}

impl DocumentNames for KnowledgeBase {
    fn document_name(&self, document_id: &str) -> Option<&str> {
        self.document(document_id).map(|d| d.name.as_str())
    }
}

impl SearchEngine for KnowledgeBase {
    fn ingest(&mut self, document: NewDocument) -> Result<Document> {
        self.add_document(document)
    }

    fn remove(&mut self, document_id: &str) -> Result<Document> {
        self.remove_document(document_id)
    }

    fn query(&self, query: &str, k: usize) -> Result<Vec<ScoredResult>> {
        Ok(self.search(query, k))
    }
}
