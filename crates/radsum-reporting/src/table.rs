use radsum_core::ReportRecord;

const FILE_WIDTH: usize = 30;
const NAME_WIDTH: usize = 25;
const SEVERITY_WIDTH: usize = 10;
const RULE_WIDTH: usize = 120;

/// Truncate to `width` chars, then pad with spaces.
fn fit(s: &str, width: usize) -> String {
    let truncated: String = s.chars().take(width).collect();
    format!("{truncated:<width$}")
}

/// Fixed-width per-report table: file, name, `label (score)`, summary.
///
/// Summary newlines are flattened to spaces so each record is one line.
pub fn render_table(records: &[ReportRecord]) -> String {
    let mut out = format!(
        "{}  {}  {}  Summary\n",
        fit("Report File", FILE_WIDTH),
        fit("Customer Name", NAME_WIDTH),
        fit("Severity", SEVERITY_WIDTH),
    );
    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');

    for r in records {
        let severity = format!("{} ({})", r.severity_label, r.severity_score);
        out.push_str(&format!(
            "{}  {}  {}  {}\n",
            fit(&r.file, FILE_WIDTH),
            fit(&r.patient_name, NAME_WIDTH),
            fit(&severity, SEVERITY_WIDTH),
            r.summary.replace('\n', " "),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use radsum_core::SeverityLabel;

    #[test]
    fn test_fit_pads_and_truncates() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdefgh", 5), "abcde");
        assert_eq!(fit("ééééé", 3), "ééé");
    }

    #[test]
    fn test_render_table_layout() {
        let records = vec![ReportRecord {
            file: "a_very_long_report_file_name_that_overflows.pdf".into(),
            patient_name: "Jane Roe".into(),
            summary: "Line one.\nLine two.".into(),
            severity_label: SeverityLabel::NoneNormal,
            severity_score: 0,
        }];
        let table = render_table(&records);
        let lines: Vec<_> = table.lines().collect();
        assert!(lines[0].starts_with("Report File"));
        assert_eq!(lines[1], "-".repeat(120));
        assert_eq!(
            lines[2],
            format!(
                "{}  {:<25}  {}  Line one. Line two.",
                &"a_very_long_report_file_name_that_overflows.pdf"[..30],
                "Jane Roe",
                "none/norma"
            )
        );
    }
}
