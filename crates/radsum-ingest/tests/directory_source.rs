//! [`DirectorySource`] over a temporary directory, with a plain-text
//! backend standing in for PDF decoding.

use std::fs;
use std::path::Path;

use radsum_core::BackendError;
use radsum_ingest::{DirectorySource, DocumentSource, PdfBackend, SourceError, discover_reports};

/// Treats every file as UTF-8 text with pages separated by form feeds.
struct PlainTextBackend;

impl PdfBackend for PlainTextBackend {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let raw = fs::read_to_string(path)?;
        let pages = raw
            .split('\u{000C}')
            .map(|p| Some(p.to_string()).filter(|p| !p.trim().is_empty()));
        Ok(radsum_core::join_pages(pages))
    }
}

fn source(dir: &Path) -> DirectorySource {
    DirectorySource::new(dir, Box::new(PlainTextBackend))
}

#[test]
fn lists_pdfs_sorted_case_insensitively() {
    let tmp = tempfile::tempdir().unwrap();
    for name in ["b.PDF", "a.pdf", "notes.txt", "c.Pdf"] {
        fs::write(tmp.path().join(name), "Findings: none").unwrap();
    }
    fs::create_dir(tmp.path().join("nested.pdf")).unwrap();

    let ids = source(tmp.path()).list().unwrap();
    assert_eq!(ids, vec!["a.pdf", "b.PDF", "c.Pdf"]);

    let paths = discover_reports(tmp.path()).unwrap();
    assert_eq!(paths.len(), 3);
}

#[test]
fn empty_directory_lists_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(source(tmp.path()).list().unwrap().is_empty());
}

#[test]
fn missing_directory_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let missing = tmp.path().join("gone");
    let err = source(&missing).list().unwrap_err();
    assert!(matches!(err, SourceError::MissingDirectory(p) if p == missing));
}

#[test]
fn read_joins_pages_and_keeps_blank_ones() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(
        tmp.path().join("r.pdf"),
        "Patient Name: Jane Roe\u{000C}   \u{000C}Impression: benign",
    )
    .unwrap();

    let doc = source(tmp.path()).read("r.pdf").unwrap();
    assert_eq!(doc.id, "r.pdf");
    assert_eq!(doc.text, "Patient Name: Jane Roe\n\nImpression: benign");
}

#[test]
fn unreadable_document_is_a_backend_error() {
    let tmp = tempfile::tempdir().unwrap();
    let err = source(tmp.path()).read("absent.pdf").unwrap_err();
    assert!(matches!(err, SourceError::Backend(BackendError::Io(_))));
}
