//! Normalization of raw classifier output into a [`ClassificationResult`].
//!
//! The classifier is asked for a JSON object but may wrap it in a markdown
//! code fence, add prose, or violate the schema. Anything that cannot be read
//! as a valid result degrades to a deterministic fallback built from the
//! section text; normalization itself never fails.

use serde::Deserialize;
use thiserror::Error;

use crate::{ClassificationResult, MAX_SEVERITY_SCORE, SeverityLabel};

/// Characters of section text kept in a fallback summary.
pub const FALLBACK_SUMMARY_CHARS: usize = 300;
/// Score used when the classifier output is unusable.
pub const FALLBACK_SCORE: u8 = 3;

/// Classifier output after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifierResponse {
    /// The output parsed and every field is within its domain.
    Parsed(ClassificationResult),
    /// The output was unusable; `result` was synthesized from the section text.
    Fallback {
        result: ClassificationResult,
        raw: String,
    },
}

impl ClassifierResponse {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn result(&self) -> &ClassificationResult {
        match self {
            Self::Parsed(result) | Self::Fallback { result, .. } => result,
        }
    }

    pub fn into_result(self) -> ClassificationResult {
        match self {
            Self::Parsed(result) | Self::Fallback { result, .. } => result,
        }
    }
}

#[derive(Error, Debug)]
enum ResponseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("JSON value is not an object")]
    NotObject,
    #[error("severity_label {0:?} is not a known label")]
    Label(String),
    #[error("severity_score {0} is not an integer in 0..=5")]
    Score(serde_json::Number),
}

/// Wire shape of the expected response. Missing fields take the same
/// defaults a consumer of a partial object would assume.
#[derive(Debug, Deserialize)]
struct WireClassification {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    severity_label: Option<String>,
    #[serde(default)]
    severity_score: Option<serde_json::Number>,
}

/// Remove a surrounding markdown code fence, if any.
///
/// The opening fence may carry a language tag (```` ```json ````). The
/// closing fence is optional.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(after_fence) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = after_fence
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .trim();
    match inner.strip_suffix("```") {
        Some(body) => body.trim(),
        None => inner,
    }
}

/// Normalize raw classifier output.
///
/// `section_text` is the text that was sent to the classifier; it seeds
/// the fallback summary.
pub fn normalize_response(raw: &str, section_text: &str) -> ClassifierResponse {
    let content = strip_code_fence(raw);
    match parse_classification(content) {
        Ok(result) => ClassifierResponse::Parsed(result),
        Err(e) => {
            tracing::debug!(error = %e, "classifier output unusable, using fallback");
            ClassifierResponse::Fallback {
                result: fallback_result(section_text, content),
                raw: content.to_string(),
            }
        }
    }
}

fn parse_classification(content: &str) -> Result<ClassificationResult, ResponseError> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    if !value.is_object() {
        return Err(ResponseError::NotObject);
    }
    let wire: WireClassification = serde_json::from_value(value)?;

    let severity_label = match wire.severity_label {
        Some(label) => SeverityLabel::parse(&label).ok_or(ResponseError::Label(label))?,
        None => SeverityLabel::Uncertain,
    };
    let severity_score = match wire.severity_score {
        Some(n) => score_in_range(&n).ok_or(ResponseError::Score(n))?,
        None => FALLBACK_SCORE,
    };

    Ok(ClassificationResult {
        summary: wire.summary.unwrap_or_default(),
        severity_label,
        severity_score,
        raw_output: None,
    })
}

/// A score written as an integer, or as a float with no fractional part
/// (`2.0`), within 0..=5.
fn score_in_range(n: &serde_json::Number) -> Option<u8> {
    let whole = match n.as_i64() {
        Some(i) => i,
        None => {
            let f = n.as_f64()?;
            if f.fract() != 0.0 {
                return None;
            }
            f as i64
        }
    };
    u8::try_from(whole).ok().filter(|s| *s <= MAX_SEVERITY_SCORE)
}

/// Deterministic result for unusable classifier output.
pub fn fallback_result(section_text: &str, raw: &str) -> ClassificationResult {
    ClassificationResult {
        summary: truncate_summary(section_text),
        severity_label: SeverityLabel::Uncertain,
        severity_score: FALLBACK_SCORE,
        raw_output: Some(raw.to_string()),
    }
}

fn truncate_summary(text: &str) -> String {
    match text.char_indices().nth(FALLBACK_SUMMARY_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
