//! Document source collaborator: lists report identifiers and loads their text.

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::Document;
use crate::backend::BackendError;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("input folder does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),
    #[error("failed to list {}: {source}", path.display())]
    List {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("{0}")]
    Unreadable(String),
}

/// Where reports come from.
///
/// `list` returns identifiers in processing order (lexicographic by file
/// name). `read` loads one document; its failure only affects that document.
pub trait DocumentSource: Send + Sync {
    fn list(&self) -> Result<Vec<String>, SourceError>;

    fn read(&self, id: &str) -> Result<Document, SourceError>;
}

/// In-memory [`DocumentSource`], for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    docs: BTreeMap<String, Result<String, String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.docs.insert(id.into(), Ok(text.into()));
        self
    }

    /// Add a document whose read fails with `message`.
    pub fn with_unreadable(mut self, id: impl Into<String>, message: impl Into<String>) -> Self {
        self.docs.insert(id.into(), Err(message.into()));
        self
    }
}

impl DocumentSource for MemorySource {
    fn list(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.docs.keys().cloned().collect())
    }

    fn read(&self, id: &str) -> Result<Document, SourceError> {
        match self.docs.get(id) {
            Some(Ok(text)) => Ok(Document::new(id, text.clone())),
            Some(Err(msg)) => Err(SourceError::Unreadable(msg.clone())),
            None => Err(SourceError::Unreadable(format!("unknown document {id}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_lists_sorted() {
        let source = MemorySource::new()
            .with_document("b.pdf", "B")
            .with_document("a.pdf", "A")
            .with_unreadable("c.pdf", "corrupt");
        assert_eq!(source.list().unwrap(), vec!["a.pdf", "b.pdf", "c.pdf"]);
        assert_eq!(source.read("a.pdf").unwrap().text, "A");
        assert!(matches!(
            source.read("c.pdf"),
            Err(SourceError::Unreadable(m)) if m == "corrupt"
        ));
    }
}
