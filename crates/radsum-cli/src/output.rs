use std::io::Write;

use owo_colors::OwoColorize;
use radsum_core::{ExportSummary, ProgressEvent, RunOutcome, SelectedSource, SeverityLabel};
use radsum_parsing::ExtractedReport;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn source_note(source: SelectedSource) -> &'static str {
    match source {
        SelectedSource::Findings => "Using FINDINGS section for summary + severity.",
        SelectedSource::Impression => "No FINDINGS section; using IMPRESSION section.",
        SelectedSource::FullReport => "No FINDINGS or IMPRESSION heading; using full report text.",
    }
}

fn colored_label(label: SeverityLabel, text: &str) -> String {
    match label {
        SeverityLabel::NoneNormal => text.green().to_string(),
        SeverityLabel::Mild => text.cyan().to_string(),
        SeverityLabel::Moderate => text.yellow().to_string(),
        SeverityLabel::Severe => text.red().bold().to_string(),
        SeverityLabel::Uncertain => text.dimmed().to_string(),
    }
}

/// Print a real-time progress event.
pub fn print_progress(
    w: &mut dyn Write,
    event: &ProgressEvent,
    color: ColorMode,
) -> std::io::Result<()> {
    match event {
        ProgressEvent::Discovered { total } => {
            writeln!(w, "Found {} PDF files.\n", total)?;
        }
        ProgressEvent::Processing { index, total, file } => {
            if color.enabled() {
                writeln!(w, "[{}/{}] Processing: {}", index + 1, total, file.bold())?;
            } else {
                writeln!(w, "[{}/{}] Processing: {}", index + 1, total, file)?;
            }
        }
        ProgressEvent::Completed {
            source,
            fallback,
            record,
            ..
        } => {
            writeln!(w, "  Customer name: {}", record.patient_name)?;
            writeln!(w, "  {}", source_note(*source))?;
            if *fallback {
                let msg = "Classifier output was not valid JSON; using fallback summary.";
                if color.enabled() {
                    writeln!(w, "  {}", msg.yellow())?;
                } else {
                    writeln!(w, "  {}", msg)?;
                }
            }
            let severity = format!("{} (score {})", record.severity_label, record.severity_score);
            if color.enabled() {
                writeln!(
                    w,
                    "  Done. Severity: {}.\n",
                    colored_label(record.severity_label, &severity)
                )?;
            } else {
                writeln!(w, "  Done. Severity: {}.\n", severity)?;
            }
        }
        ProgressEvent::Skipped { file, reason, .. } => {
            let msg = format!("Skipped {}: {}", file, reason);
            if color.enabled() {
                writeln!(w, "  {}\n", msg.red())?;
            } else {
                writeln!(w, "  {}\n", msg)?;
            }
        }
        ProgressEvent::Cancelled { processed, total } => {
            let msg = format!("Cancelled after {} of {} reports.", processed, total);
            if color.enabled() {
                writeln!(w, "{}\n", msg.yellow())?;
            } else {
                writeln!(w, "{}\n", msg)?;
            }
        }
    }
    Ok(())
}

/// Print the per-report table for a run that produced records.
pub fn print_table(
    w: &mut dyn Write,
    outcome: &RunOutcome,
    color: ColorMode,
) -> std::io::Result<()> {
    let heading = "Per-report Summary (one row per PDF):";
    if color.enabled() {
        writeln!(w, "\n{}\n", heading.bold())?;
    } else {
        writeln!(w, "\n{}\n", heading)?;
    }
    write!(w, "{}", radsum_reporting::render_table(&outcome.records))?;

    if !outcome.skipped.is_empty() {
        writeln!(w)?;
        let line = format!(
            "Skipped {} of {} reports:",
            outcome.skipped.len(),
            outcome.total_documents
        );
        if color.enabled() {
            writeln!(w, "{}", line.yellow())?;
        } else {
            writeln!(w, "{}", line)?;
        }
        for s in &outcome.skipped {
            writeln!(w, "  {}: {}", s.file, s.reason)?;
        }
    }
    Ok(())
}

pub fn print_export(
    w: &mut dyn Write,
    summary: &ExportSummary,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    for path in &summary.paths {
        if color.enabled() {
            writeln!(w, "Saved {} rows to: {}", summary.rows, path.display().green())?;
        } else {
            writeln!(w, "Saved {} rows to: {}", summary.rows, path.display())?;
        }
    }
    Ok(())
}

/// Print one report's extraction result without classifying it.
pub fn print_dry_run_entry(
    w: &mut dyn Write,
    index: usize,
    total: usize,
    file: &str,
    report: &ExtractedReport,
    color: ColorMode,
) -> std::io::Result<()> {
    let selected = report.selected();
    if color.enabled() {
        writeln!(w, "{}", format!("[{}/{}] {}", index + 1, total, file).bold().yellow())?;
    } else {
        writeln!(w, "[{}/{}] {}", index + 1, total, file)?;
    }
    writeln!(w, "  Name:    {}", report.patient_name)?;
    writeln!(w, "  Source:  {}", selected.source)?;

    let flat: String = selected.text.split_whitespace().collect::<Vec<_>>().join(" ");
    let preview = if flat.chars().count() > 200 {
        format!("{}...", flat.chars().take(200).collect::<String>())
    } else {
        flat
    };
    if color.enabled() {
        writeln!(w, "  Preview: {}", preview.dimmed())?;
    } else {
        writeln!(w, "  Preview: {}", preview)?;
    }
    writeln!(w)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use radsum_core::{ReportRecord, SkipReason};

    fn render(event: ProgressEvent) -> String {
        let mut buf = Vec::new();
        print_progress(&mut buf, &event, ColorMode(false)).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_completed_event_plain() {
        let out = render(ProgressEvent::Completed {
            index: 0,
            total: 2,
            source: SelectedSource::Impression,
            fallback: true,
            record: Box::new(ReportRecord {
                file: "a.pdf".into(),
                patient_name: "Jane Roe".into(),
                summary: "s".into(),
                severity_label: SeverityLabel::Uncertain,
                severity_score: 3,
            }),
        });
        assert!(out.contains("Customer name: Jane Roe"));
        assert!(out.contains("using IMPRESSION section"));
        assert!(out.contains("fallback summary"));
        assert!(out.contains("Severity: uncertain (score 3)."));
    }

    #[test]
    fn test_skipped_event_plain() {
        let out = render(ProgressEvent::Skipped {
            index: 1,
            total: 2,
            file: "b.pdf".into(),
            reason: SkipReason::Classification("HTTP 500".into()),
        });
        assert_eq!(
            out.trim(),
            "Skipped b.pdf: error during classification call: HTTP 500"
        );
    }

    #[test]
    fn test_dry_run_entry_preview_truncated() {
        let long = format!("Findings: {}", "word ".repeat(100));
        let report = radsum_parsing::ReportExtractor::new().extract(&long);
        let mut buf = Vec::new();
        print_dry_run_entry(&mut buf, 0, 1, "a.pdf", &report, ColorMode(false)).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.starts_with("[1/1] a.pdf\n"));
        assert!(out.contains("  Name:    Unknown\n"));
        assert!(out.contains("  Source:  findings\n"));
        assert!(out.contains("..."));
    }
}
