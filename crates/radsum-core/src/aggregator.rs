use std::time::Duration;

use radsum_parsing::{NameExtractor, ReportExtractor, SelectedSource};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::classifier::Classifier;
use crate::prompt::build_prompt;
use crate::response::normalize_response;
use crate::source::DocumentSource;
use crate::{Config, CoreError, Document, ReportRecord};

/// Why a document produced no record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("error reading document: {0}")]
    Unreadable(String),
    #[error("error during classification call: {0}")]
    Classification(String),
    #[error("classification timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

/// A document that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    pub file: String,
    pub reason: SkipReason,
}

/// Progress events emitted during a run.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Discovered {
        total: usize,
    },
    Processing {
        index: usize,
        total: usize,
        file: String,
    },
    Completed {
        index: usize,
        total: usize,
        source: SelectedSource,
        fallback: bool,
        record: Box<ReportRecord>,
    },
    Skipped {
        index: usize,
        total: usize,
        file: String,
        reason: SkipReason,
    },
    Cancelled {
        processed: usize,
        total: usize,
    },
}

/// Coarse result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The source listed no documents.
    NoDocuments,
    /// Documents were found but none produced a record.
    NoRecords,
    Completed,
}

/// Everything a run produced.
///
/// Records are append-only and stay in document order.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub total_documents: usize,
    pub records: Vec<ReportRecord>,
    pub skipped: Vec<SkippedDocument>,
    pub cancelled: bool,
}

impl RunOutcome {
    fn new(total_documents: usize) -> Self {
        Self {
            total_documents,
            ..Self::default()
        }
    }

    fn push_record(&mut self, record: ReportRecord) {
        self.records.push(record);
    }

    fn push_skipped(&mut self, file: &str, reason: SkipReason) {
        self.skipped.push(SkippedDocument {
            file: file.to_string(),
            reason,
        });
    }

    pub fn status(&self) -> RunStatus {
        if self.total_documents == 0 {
            RunStatus::NoDocuments
        } else if self.records.is_empty() {
            RunStatus::NoRecords
        } else {
            RunStatus::Completed
        }
    }
}

/// One successfully processed document.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub record: ReportRecord,
    pub source: SelectedSource,
    /// The classifier output was unusable and the fallback result was used.
    pub fallback: bool,
}

/// Drives every document of a source through the pipeline.
///
/// Per document:
/// 1. Normalize the text and extract the patient name
/// 2. Extract FINDINGS and IMPRESSION, select the text to classify
/// 3. Call the classifier (bounded by the configured timeout)
/// 4. Normalize the response, falling back on unusable output
/// 5. Append the record
///
/// Documents are processed one at a time in listing order. A failure to
/// read or classify one document skips it and the run continues.
pub struct ReportAggregator<'a> {
    classifier: &'a dyn Classifier,
    extractor: ReportExtractor,
    model: String,
    timeout: Duration,
}

impl<'a> ReportAggregator<'a> {
    pub fn new(classifier: &'a dyn Classifier, config: &Config) -> Self {
        let names = NameExtractor::new().with_fall_through(config.fall_through_on_long_name);
        Self {
            classifier,
            extractor: ReportExtractor::new().with_name_extractor(names),
            model: config.model.clone(),
            timeout: config.timeout(),
        }
    }

    /// Run one document through extraction, classification and normalization.
    pub async fn process_document(&self, doc: &Document) -> Result<ProcessedDocument, SkipReason> {
        let report = self.extractor.extract(&doc.text);
        let selected = report.selected();
        tracing::debug!(
            file = %doc.id,
            patient = %report.patient_name,
            source = %selected.source,
            chars = selected.text.len(),
            "section selected"
        );

        let prompt = build_prompt(selected.text, selected.source);
        let raw = match tokio::time::timeout(
            self.timeout,
            self.classifier.classify(&prompt, &self.model),
        )
        .await
        {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => return Err(SkipReason::Classification(e.to_string())),
            Err(_) => return Err(SkipReason::TimedOut(self.timeout)),
        };

        let response = normalize_response(&raw, selected.text);
        let fallback = response.is_fallback();
        if fallback {
            tracing::warn!(file = %doc.id, "classifier output was not valid JSON, used fallback");
        }
        let record = ReportRecord::new(&doc.id, &report.patient_name, response.result());

        Ok(ProcessedDocument {
            record,
            source: selected.source,
            fallback,
        })
    }

    /// Process every document of `source`.
    ///
    /// Only a failure to list the source is fatal. Cancelling `cancel` stops
    /// the run before the next document (or during an in-flight classifier
    /// call) and returns what was collected so far.
    pub async fn run<F>(
        &self,
        source: &dyn DocumentSource,
        progress: F,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome, CoreError>
    where
        F: Fn(ProgressEvent),
    {
        let ids = source.list()?;
        let total = ids.len();
        progress(ProgressEvent::Discovered { total });
        tracing::info!(total, classifier = self.classifier.name(), "starting run");

        let mut outcome = RunOutcome::new(total);

        for (index, id) in ids.iter().enumerate() {
            if cancel.is_cancelled() {
                outcome.cancelled = true;
                progress(ProgressEvent::Cancelled {
                    processed: index,
                    total,
                });
                break;
            }

            progress(ProgressEvent::Processing {
                index,
                total,
                file: id.clone(),
            });

            let doc = match source.read(id) {
                Ok(doc) => doc,
                Err(e) => {
                    let reason = SkipReason::Unreadable(e.to_string());
                    tracing::warn!(file = %id, error = %reason, "skipping document");
                    progress(ProgressEvent::Skipped {
                        index,
                        total,
                        file: id.clone(),
                        reason: reason.clone(),
                    });
                    outcome.push_skipped(id, reason);
                    continue;
                }
            };

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    outcome.cancelled = true;
                    progress(ProgressEvent::Cancelled { processed: index, total });
                    break;
                }
                result = self.process_document(&doc) => result,
            };

            match result {
                Ok(processed) => {
                    tracing::info!(
                        file = %id,
                        label = %processed.record.severity_label,
                        score = processed.record.severity_score,
                        "document classified"
                    );
                    progress(ProgressEvent::Completed {
                        index,
                        total,
                        source: processed.source,
                        fallback: processed.fallback,
                        record: Box::new(processed.record.clone()),
                    });
                    outcome.push_record(processed.record);
                }
                Err(reason) => {
                    tracing::warn!(file = %id, error = %reason, "skipping document");
                    progress(ProgressEvent::Skipped {
                        index,
                        total,
                        file: id.clone(),
                        reason: reason.clone(),
                    });
                    outcome.push_skipped(id, reason);
                }
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{MockClassifier, MockResponse};
    use crate::{MemorySource, SeverityLabel};

    const NORMAL: &str =
        r#"{"summary":"Normal brain MRI.","severity_label":"none/normal","severity_score":0}"#;

    fn config() -> Config {
        Config::default()
    }

    #[tokio::test]
    async fn process_document_uses_findings_in_prompt() {
        let mock = MockClassifier::returning(NORMAL);
        let config = config();
        let agg = ReportAggregator::new(&mock, &config);
        let doc = Document::new(
            "a.pdf",
            "Patient: Ann Lee\nFindings: no acute abnormality.\nImpression: normal study.",
        );

        let processed = agg.process_document(&doc).await.unwrap();
        assert_eq!(processed.source, SelectedSource::Findings);
        assert!(!processed.fallback);
        assert_eq!(processed.record.patient_name, "Ann Lee");
        assert_eq!(processed.record.severity_label, SeverityLabel::NoneNormal);

        let prompts = mock.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Source type: findings"));
        assert!(prompts[0].contains("\"\"\"no acute abnormality.\"\"\""));
    }

    #[tokio::test]
    async fn process_document_fallback_summary_from_section() {
        let mock = MockClassifier::returning("I cannot produce JSON today.");
        let config = config();
        let agg = ReportAggregator::new(&mock, &config);
        let doc = Document::new("b.pdf", "IMPRESSION: Small chronic infarct.");

        let processed = agg.process_document(&doc).await.unwrap();
        assert!(processed.fallback);
        assert_eq!(processed.source, SelectedSource::Impression);
        assert_eq!(processed.record.summary, "Small chronic infarct.");
        assert_eq!(processed.record.severity_label, SeverityLabel::Uncertain);
        assert_eq!(processed.record.severity_score, 3);
    }

    #[tokio::test]
    async fn classification_error_is_skip_reason() {
        let mock = MockClassifier::new(MockResponse::Error("401 unauthorized".into()));
        let config = config();
        let agg = ReportAggregator::new(&mock, &config);
        let err = agg
            .process_document(&Document::new("c.pdf", "text"))
            .await
            .unwrap_err();
        assert_eq!(err, SkipReason::Classification("401 unauthorized".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn classification_timeout_is_skip_reason() {
        let mock = MockClassifier::returning(NORMAL).with_delay(Duration::from_secs(120));
        let config = Config {
            timeout_secs: 5,
            ..Config::default()
        };
        let agg = ReportAggregator::new(&mock, &config);
        let err = agg
            .process_document(&Document::new("d.pdf", "text"))
            .await
            .unwrap_err();
        assert_eq!(err, SkipReason::TimedOut(Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn run_skips_unreadable_and_continues() {
        let source = MemorySource::new()
            .with_unreadable("a.pdf", "corrupt xref table")
            .with_document("b.pdf", "Findings: mild edema.");
        let mock = MockClassifier::returning(
            r#"{"summary":"Mild edema.","severity_label":"mild","severity_score":2}"#,
        );
        let config = config();
        let agg = ReportAggregator::new(&mock, &config);

        let events = std::sync::Mutex::new(Vec::new());
        let outcome = agg
            .run(
                &source,
                |e| events.lock().unwrap().push(e),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.status(), RunStatus::Completed);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].file, "b.pdf");
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].file, "a.pdf");
        assert_eq!(
            outcome.skipped[0].reason.to_string(),
            "error reading document: corrupt xref table"
        );
        assert_eq!(mock.call_count(), 1);

        let events = events.into_inner().unwrap();
        assert!(matches!(events[0], ProgressEvent::Discovered { total: 2 }));
        assert!(
            events
                .iter()
                .any(|e| matches!(e, ProgressEvent::Skipped { file, .. } if file == "a.pdf"))
        );
    }

    #[tokio::test]
    async fn run_cancelled_before_start_processes_nothing() {
        let source = MemorySource::new().with_document("a.pdf", "Findings: x.");
        let mock = MockClassifier::returning(NORMAL);
        let config = config();
        let agg = ReportAggregator::new(&mock, &config);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = agg.run(&source, |_| {}, &cancel).await.unwrap();
        assert!(outcome.cancelled);
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.status(), RunStatus::NoRecords);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn run_empty_source() {
        let mock = MockClassifier::returning(NORMAL);
        let config = config();
        let agg = ReportAggregator::new(&mock, &config);
        let outcome = agg
            .run(&MemorySource::new(), |_| {}, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.status(), RunStatus::NoDocuments);
        assert_eq!(mock.call_count(), 0);
    }
}
