//! Export collaborator boundary.

use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

use crate::{ReportRecord, RunOutcome};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize records: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Other(String),
}

/// What an export wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub rows: usize,
    pub paths: Vec<PathBuf>,
}

/// Destination for the ordered records of a run.
pub trait ReportSink {
    fn export(&self, records: &[ReportRecord]) -> Result<ExportSummary, ExportError>;
}

/// Hand the outcome's records to `sink`.
///
/// A run without records never reaches the sink and yields `Ok(None)`.
/// On failure the records stay available in `outcome`.
pub fn export_outcome(
    outcome: &RunOutcome,
    sink: &dyn ReportSink,
) -> Result<Option<ExportSummary>, ExportError> {
    if outcome.records.is_empty() {
        tracing::info!("no records produced, skipping export");
        return Ok(None);
    }
    let summary = sink.export(&outcome.records)?;
    tracing::info!(rows = summary.rows, "exported records");
    Ok(Some(summary))
}

/// [`ReportSink`] that keeps every export in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    exports: Mutex<Vec<Vec<ReportRecord>>>,
    fail_with: Option<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every export fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            exports: Mutex::new(Vec::new()),
            fail_with: Some(message.into()),
        }
    }

    /// Number of times `export` was called.
    pub fn call_count(&self) -> usize {
        self.exports.lock().map(|e| e.len()).unwrap_or_default()
    }

    /// Records passed to each call, in call order.
    pub fn exports(&self) -> Vec<Vec<ReportRecord>> {
        self.exports.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ReportSink for MemorySink {
    fn export(&self, records: &[ReportRecord]) -> Result<ExportSummary, ExportError> {
        if let Ok(mut exports) = self.exports.lock() {
            exports.push(records.to_vec());
        }
        if let Some(msg) = &self.fail_with {
            return Err(ExportError::Other(msg.clone()));
        }
        Ok(ExportSummary {
            rows: records.len(),
            paths: Vec::new(),
        })
    }
}
