use std::io::Write;
use std::path::{Path, PathBuf};

use radsum_core::{ExportError, ExportSummary, ReportRecord, ReportSink};

/// File stem shared by the CSV and JSON outputs.
pub const OUTPUT_BASENAME: &str = "mri_per_report_summary";

pub const CSV_HEADER: &str = "report_file,patient_name,severity_label,severity_score,summary";

/// [`ReportSink`] writing `mri_per_report_summary.csv` and
/// `mri_per_report_summary.json` into an existing output directory.
#[derive(Debug, Clone)]
pub struct FileExporter {
    output_dir: PathBuf,
}

impl FileExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join(format!("{OUTPUT_BASENAME}.csv"))
    }

    pub fn json_path(&self) -> PathBuf {
        self.output_dir.join(format!("{OUTPUT_BASENAME}.json"))
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::create(path).map_err(io_err)?;
    file.write_all(content.as_bytes()).map_err(io_err)?;
    Ok(())
}

impl ReportSink for FileExporter {
    fn export(&self, records: &[ReportRecord]) -> Result<ExportSummary, ExportError> {
        // Serialize both before touching the filesystem.
        let csv = export_csv(records);
        let json = export_json(records)?;

        let csv_path = self.csv_path();
        let json_path = self.json_path();
        write_file(&csv_path, &csv)?;
        write_file(&json_path, &json)?;

        tracing::info!(
            rows = records.len(),
            csv = %csv_path.display(),
            json = %json_path.display(),
            "wrote report summaries"
        );
        Ok(ExportSummary {
            rows: records.len(),
            paths: vec![csv_path, json_path],
        })
    }
}

fn csv_escape(s: &str) -> String {
    if s.contains('"') || s.contains(',') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Records as CSV with a header row, CRLF line endings.
pub fn export_csv(records: &[ReportRecord]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push_str("\r\n");
    for r in records {
        out.push_str(&format!(
            "{},{},{},{},{}\r\n",
            csv_escape(&r.file),
            csv_escape(&r.patient_name),
            csv_escape(r.severity_label.as_str()),
            r.severity_score,
            csv_escape(&r.summary),
        ));
    }
    out
}

/// Records as a pretty-printed JSON array, in order.
pub fn export_json(records: &[ReportRecord]) -> Result<String, ExportError> {
    let mut out = serde_json::to_string_pretty(records)?;
    out.push('\n');
    Ok(out)
}
