use std::path::{Path, PathBuf};

use radsum_core::SourceError;

/// Whether `path` names a report file (`.pdf`, any case).
pub fn is_report_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// List the report files directly inside `dir`, sorted by file name.
///
/// Subdirectories are not searched.
pub fn discover_reports(dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
    if !dir.is_dir() {
        return Err(SourceError::MissingDirectory(dir.to_path_buf()));
    }

    let list_err = |source| SourceError::List {
        path: dir.to_path_buf(),
        source,
    };

    let mut reports = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(list_err)? {
        let path = entry.map_err(list_err)?.path();
        if path.is_file() && is_report_path(&path) {
            reports.push(path);
        }
    }
    reports.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    tracing::debug!(dir = %dir.display(), count = reports.len(), "discovered reports");
    Ok(reports)
}
