use std::path::Path;

use mupdf::{Document, Page, TextPageFlags};

use radsum_core::{BackendError, PdfBackend, join_pages};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// Keeps the AGPL mupdf dependency out of every other crate. Report
/// headers carry the patient block, so unlike layout-aware extractors no
/// page margin is dropped.
#[derive(Debug, Default)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Text of one page, line by line. `Ok(None)` when the page decodes but
/// carries no text layer.
fn page_text(page: &Page) -> Result<Option<String>, BackendError> {
    let text_page = page
        .to_text_page(TextPageFlags::empty())
        .map_err(|e| BackendError::Extract(e.to_string()))?;

    let mut text = String::new();
    for block in text_page.blocks() {
        for line in block.lines() {
            text.extend(line.chars().map(|c| c.char().unwrap_or('\u{FFFD}')));
            text.push('\n');
        }
    }
    Ok(non_blank(text))
}

fn non_blank(text: String) -> Option<String> {
    if text.trim().is_empty() { None } else { Some(text) }
}

impl PdfBackend for MupdfBackend {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::Open("invalid path encoding".into()))?;

        let document = Document::open(path_str).map_err(|e| BackendError::Open(e.to_string()))?;

        let mut pages = Vec::new();
        for (index, page_result) in document
            .pages()
            .map_err(|e| BackendError::Extract(e.to_string()))?
            .enumerate()
        {
            let page = page_result
                .map_err(|e| BackendError::Extract(format!("page {}: {}", index + 1, e)))?;
            pages.push(page_text(&page)?);
        }

        tracing::debug!(path = %path.display(), pages = pages.len(), "extracted report text");
        Ok(join_pages(pages))
    }
}
