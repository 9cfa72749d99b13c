use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod aggregator;
pub mod backend;
pub mod classifier;
pub mod config_file;
pub mod export;
pub mod prompt;
pub mod response;
pub mod source;

// Re-export for convenience
pub use aggregator::{
    ProcessedDocument, ProgressEvent, ReportAggregator, RunOutcome, RunStatus, SkipReason,
    SkippedDocument,
};
pub use backend::{BackendError, PdfBackend, join_pages};
pub use classifier::{Classifier, ClassifyError};
pub use export::{ExportError, ExportSummary, MemorySink, ReportSink, export_outcome};
pub use radsum_parsing::SelectedSource;
pub use response::{ClassifierResponse, normalize_response};
pub use source::{DocumentSource, MemorySource, SourceError};

/// A report as produced by the document source: identifier plus raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Coarse five-level severity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeverityLabel {
    #[serde(rename = "none/normal")]
    NoneNormal,
    #[serde(rename = "mild")]
    Mild,
    #[serde(rename = "moderate")]
    Moderate,
    #[serde(rename = "severe")]
    Severe,
    #[serde(rename = "uncertain")]
    Uncertain,
}

impl SeverityLabel {
    pub const ALL: [SeverityLabel; 5] = [
        Self::NoneNormal,
        Self::Mild,
        Self::Moderate,
        Self::Severe,
        Self::Uncertain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoneNormal => "none/normal",
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
            Self::Uncertain => "uncertain",
        }
    }

    /// Parse a label as written by the classifier. Case and surrounding
    /// whitespace are ignored; `none` and `normal` alone mean `none/normal`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "none/normal" | "none" | "normal" => Some(Self::NoneNormal),
            "mild" => Some(Self::Mild),
            "moderate" => Some(Self::Moderate),
            "severe" => Some(Self::Severe),
            "uncertain" => Some(Self::Uncertain),
            _ => None,
        }
    }
}

impl fmt::Display for SeverityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Highest severity score (0 = normal, 5 = critical).
pub const MAX_SEVERITY_SCORE: u8 = 5;

/// Normalized classifier output for one report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub summary: String,
    pub severity_label: SeverityLabel,
    pub severity_score: u8,
    /// Unparsed classifier output, kept only when the fallback was used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
}

/// One exported row: the final result for one report file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub file: String,
    pub patient_name: String,
    pub summary: String,
    pub severity_label: SeverityLabel,
    pub severity_score: u8,
}

impl ReportRecord {
    pub fn new(file: &str, patient_name: &str, result: &ClassificationResult) -> Self {
        Self {
            file: file.to_string(),
            patient_name: patient_name.to_string(),
            summary: result.summary.trim().to_string(),
            severity_label: result.severity_label,
            severity_score: result.severity_score,
        }
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("document source error: {0}")]
    Source(#[from] SourceError),
    #[error("configuration error: {0}")]
    Config(String),
}

pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Runtime configuration for a summarization run.
#[derive(Clone)]
pub struct Config {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Try the next name label when a match is rejected by the length rule.
    pub fall_through_on_long_name: bool,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reject settings that would make every classifier call fail.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.timeout_secs == 0 {
            return Err(CoreError::Config(
                "classifier timeout must be at least 1 second".into(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(CoreError::Config("classifier model name is empty".into()));
        }
        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("fall_through_on_long_name", &self.fall_through_on_long_name)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            fall_through_on_long_name: false,
        }
    }
}
