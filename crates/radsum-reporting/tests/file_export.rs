//! [`FileExporter`] writing into a temporary output directory.

use radsum_core::{
    ExportError, ReportRecord, ReportSink, RunOutcome, SeverityLabel, export_outcome,
};
use radsum_reporting::{CSV_HEADER, FileExporter};

fn records() -> Vec<ReportRecord> {
    vec![
        ReportRecord {
            file: "a.pdf".into(),
            patient_name: "Unknown".into(),
            summary: "No acute abnormality.".into(),
            severity_label: SeverityLabel::NoneNormal,
            severity_score: 0,
        },
        ReportRecord {
            file: "b.pdf".into(),
            patient_name: "Roe, Jane".into(),
            summary: "Severe stenosis, \"critical\".".into(),
            severity_label: SeverityLabel::Severe,
            severity_score: 4,
        },
    ]
}

#[test]
fn writes_csv_and_json() {
    let tmp = tempfile::tempdir().unwrap();
    let exporter = FileExporter::new(tmp.path());

    let summary = exporter.export(&records()).unwrap();
    assert_eq!(summary.rows, 2);
    assert_eq!(
        summary.paths,
        vec![
            tmp.path().join("mri_per_report_summary.csv"),
            tmp.path().join("mri_per_report_summary.json"),
        ]
    );

    let csv = std::fs::read_to_string(exporter.csv_path()).unwrap();
    let mut lines = csv.split("\r\n");
    assert_eq!(lines.next(), Some(CSV_HEADER));
    assert_eq!(lines.next(), Some("a.pdf,Unknown,none/normal,0,No acute abnormality."));
    assert_eq!(
        lines.next(),
        Some("b.pdf,\"Roe, Jane\",severe,4,\"Severe stenosis, \"\"critical\"\".\"")
    );

    let json = std::fs::read_to_string(exporter.json_path()).unwrap();
    let parsed: Vec<ReportRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, records());
}

#[test]
fn missing_output_directory_is_io_error() {
    let tmp = tempfile::tempdir().unwrap();
    let exporter = FileExporter::new(tmp.path().join("missing"));
    let err = exporter.export(&records()).unwrap_err();
    assert!(matches!(err, ExportError::Io { .. }));
}

#[test]
fn zero_record_outcome_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let exporter = FileExporter::new(tmp.path());
    let outcome = RunOutcome::default();

    assert!(export_outcome(&outcome, &exporter).unwrap().is_none());
    assert!(!exporter.csv_path().exists());
    assert!(!exporter.json_path().exists());
}
