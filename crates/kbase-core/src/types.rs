//! Domain types shared by the retrieval engine and its collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

pub type ChunkId = String;
pub type DocumentId = String;

/// Where a document's text came from.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Pdf,
    Markdown,
    #[default]
    Text,
    Html,
}

impl SourceType {
    /// Maps a file extension (with or without the leading dot) to a source type.
    /// Unknown extensions are treated as plain text.
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "md" => Self::Markdown,
            "html" => Self::Html,
            _ => Self::Text,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or_default()
    }
}

/// An uploaded or pasted source unit. Owned by the storage layer; the
/// retrieval engine only fills in `chunk_count` at ingest time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub filename: String,
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub category: String,
    pub tags: Vec<String>,
    pub chunk_count: usize,
    pub size: usize,
    pub ingested_at: DateTime<Utc>,
}

/// Default category for documents registered without one.
pub const DEFAULT_CATEGORY: &str = "general";
/// Display name for text submitted with neither a name nor a filename.
pub const PASTED_CONTENT: &str = "Pasted Content";

/// A document as submitted for ingestion: extracted text plus the metadata
/// the storage layer keeps about it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewDocument {
    /// Display name; derived from `filename` when absent.
    #[serde(default)]
    pub name: Option<String>,
    pub filename: String,
    pub text: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Accepts either a list or a single comma-separated string.
    #[serde(default, deserialize_with = "tags_from_string_or_list")]
    pub tags: Vec<String>,
    /// Overrides the configured chunk size for this document only.
    #[serde(default)]
    pub chunk_size: Option<usize>,
}

impl NewDocument {
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self { filename: filename.into(), text: text.into(), ..Self::default() }
    }

    /// Name shown in search results: the explicit name, the filename
    /// without its extension, or [`PASTED_CONTENT`] when both are blank.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        Path::new(self.filename.trim())
            .file_stem()
            .map(|s| s.to_string_lossy().trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| PASTED_CONTENT.to_string())
    }

    pub fn source_type(&self) -> SourceType {
        SourceType::from_path(Path::new(&self.filename))
    }
}

/// Splits a comma-separated tag string, trimming each entry and dropping blanks.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|t| !t.is_empty()).map(str::to_string).collect()
}

fn tags_from_string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tags {
        Joined(String),
        List(Vec<String>),
    }

    Ok(match Tags::deserialize(deserializer)? {
        Tags::Joined(raw) => parse_tags(&raw),
        Tags::List(tags) => tags,
    })
}

/// An indexable passage of a document.
///
/// - `position`: zero-based ordinal within the owning document
/// - `content`: never empty
/// - `keywords`: most frequent first, at most 50 entries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub id: ChunkId,
    pub document_id: DocumentId,
    pub position: usize,
    pub content: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Output of ingest: a chunk that has not been given an id or owner yet.
/// `position` is authoritative and must be preserved by whoever stores it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkDraft {
    pub content: String,
    pub position: usize,
    pub keywords: Vec<String>,
}

impl ChunkDraft {
    pub fn into_chunk(self, id: ChunkId, document_id: DocumentId) -> Chunk {
        Chunk { id, document_id, position: self.position, content: self.content, keywords: self.keywords }
    }
}

/// A ranked hit as returned to callers.
///
/// `score` is rounded to two decimals and only meant for display; ranking
/// always happens on the unrounded value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoredResult {
    pub chunk_id: ChunkId,
    pub document_id: DocumentId,
    pub document_name: String,
    pub content: String,
    pub score: f64,
    pub position: usize,
}

/// Display name used when a document id has no registered name.
pub const UNKNOWN_DOCUMENT: &str = "Unknown";

/// Rounds a relevance score to two decimals for presentation.
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

/// Request shape accepted at the API boundary, before the limit is clamped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl SearchRequest {
    /// Resolves the effective limit. Missing means `default`; anything <= 0
    /// clamps to 0, which yields no results.
    pub fn effective_limit(&self, default: usize) -> usize {
        match self.limit {
            None => default,
            Some(n) if n <= 0 => 0,
            Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
        }
    }
}
