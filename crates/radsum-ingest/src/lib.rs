use std::path::{Path, PathBuf};

use thiserror::Error;

mod discover;

pub use discover::{discover_reports, is_report_path};
pub use radsum_core::{Document, DocumentSource, PdfBackend, SourceError};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[cfg(not(feature = "pdf"))]
    #[error("PDF support not compiled in (enable the `pdf` feature of radsum-ingest)")]
    NoPdfSupport,
}

/// [`DocumentSource`] over the report files of one directory.
///
/// Identifiers are bare file names; text comes from the configured
/// [`PdfBackend`].
pub struct DirectorySource {
    dir: PathBuf,
    backend: Box<dyn PdfBackend>,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>, backend: Box<dyn PdfBackend>) -> Self {
        Self {
            dir: dir.into(),
            backend,
        }
    }

    /// A source over `dir` using the default PDF backend.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, IngestError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(SourceError::MissingDirectory(dir).into());
        }
        Ok(Self::new(dir, default_backend()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DocumentSource for DirectorySource {
    fn list(&self) -> Result<Vec<String>, SourceError> {
        Ok(discover_reports(&self.dir)?
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect())
    }

    fn read(&self, id: &str) -> Result<Document, SourceError> {
        let path = self.dir.join(id);
        let text = self.backend.extract_text(&path)?;
        Ok(Document::new(id, text))
    }
}

#[cfg(feature = "pdf")]
fn default_backend() -> Result<Box<dyn PdfBackend>, IngestError> {
    Ok(Box::new(radsum_pdf_mupdf::MupdfBackend::new()))
}

#[cfg(not(feature = "pdf"))]
fn default_backend() -> Result<Box<dyn PdfBackend>, IngestError> {
    Err(IngestError::NoPdfSupport)
}
