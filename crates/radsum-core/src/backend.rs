use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("cannot open document: {0}")]
    Open(String),
    #[error("cannot extract page text: {0}")]
    Extract(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Text extraction from a binary report file (PDF).
///
/// Implementors own page iteration. The document text is every page's text
/// joined with `\n`; see [`join_pages`].
pub trait PdfBackend: Send + Sync {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError>;
}

/// Join per-page text with line breaks. A page with no text layer (`None`)
/// contributes an empty string so page positions stay stable.
pub fn join_pages<I>(pages: I) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    pages
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages_keeps_empty_pages() {
        let text = join_pages([Some("page one".to_string()), None, Some("page three".into())]);
        assert_eq!(text, "page one\n\npage three");
    }

    #[test]
    fn test_join_pages_empty_document() {
        assert_eq!(join_pages(Vec::<Option<String>>::new()), "");
    }
}
