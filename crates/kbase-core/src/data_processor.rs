//! Loads text-bearing source files from a directory tree into
//! [`NewDocument`]s ready for ingestion.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::types::NewDocument;

/// Extensions whose contents are already plain text.
pub const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown", "html", "htm"];

#[derive(Debug, Clone, Default)]
pub struct DataProcessor {
    category: Option<String>,
}

impl DataProcessor {
    pub fn new() -> Self { Self::default() }

    /// Category assigned to every loaded document.
    pub fn with_category(category: impl Into<String>) -> Self {
        Self { category: Some(category.into()) }
    }

    pub fn load_directory(&self, data_dir: &Path) -> Result<Vec<NewDocument>> {
        self.load_directory_limited(data_dir, usize::MAX)
    }

    pub fn load_directory_limited(&self, data_dir: &Path, limit: usize) -> Result<Vec<NewDocument>> {
        if !data_dir.is_dir() {
            return Err(Error::NotFound(format!("directory {}", data_dir.display())));
        }
        let mut files = self.list_text_files(data_dir);
        if files.len() > limit {
            files.truncate(limit);
            debug!(limit, "limited source files");
        }
        let mut documents = Vec::with_capacity(files.len());
        for file_path in &files {
            match self.load_file(file_path) {
                Ok(doc) => documents.push(doc),
                Err(e) => warn!(path = %file_path.display(), error = %e, "skipping unreadable file"),
            }
        }
        debug!(dir = %data_dir.display(), documents = documents.len(), "loaded source files");
        Ok(documents)
    }

    pub fn load_file(&self, file_path: &Path) -> Result<NewDocument> {
        let text = read_file_content(file_path)?;
        let filename = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::InvalidArgument(format!("not a file: {}", file_path.display())))?;
        let mut doc = NewDocument::new(filename, text);
        doc.category = self.category.clone();
        Ok(doc)
    }

    fn list_text_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut text_files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| is_text_file(p))
            .collect();
        text_files.sort();
        text_files
    }
}

pub fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| TEXT_EXTENSIONS.iter().any(|t| t.eq_ignore_ascii_case(ext)))
}

fn read_file_content(file_path: &Path) -> Result<String> {
    let bytes = fs::read(file_path)
        .map_err(|e| Error::Operation(format!("read {}: {}", file_path.display(), e)))?;
    Ok(match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}
