pub mod name;
pub mod normalize;
pub mod section;
pub mod select;

pub use name::{FieldMatch, MAX_NAME_CHARS, NameExtractor, UNKNOWN_NAME, extract_patient_name};
pub use normalize::normalize_text;
pub use section::{
    FINDINGS, IMPRESSION, Section, SectionPattern, SectionSpec, extract_findings_section,
    extract_impression_section, extract_section,
};
pub use select::{SelectedSection, SelectedSource, select_section};

/// Everything the parsing stage derives from one report's raw text.
#[derive(Debug, Clone)]
pub struct ExtractedReport {
    pub text: String,
    pub patient_name: String,
    pub findings: Option<String>,
    pub impression: Option<String>,
}

impl ExtractedReport {
    /// The text to classify: FINDINGS, then IMPRESSION, then the full text.
    pub fn selected(&self) -> SelectedSection<'_> {
        select_section(
            self.findings.as_deref(),
            self.impression.as_deref(),
            &self.text,
        )
    }
}

/// Parsing pipeline for a single report.
///
/// 1. Normalize line endings and non-breaking spaces
/// 2. Extract the patient name
/// 3. Extract the FINDINGS and IMPRESSION sections
#[derive(Debug, Clone, Default)]
pub struct ReportExtractor {
    names: NameExtractor,
}

impl ReportExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name_extractor(mut self, names: NameExtractor) -> Self {
        self.names = names;
        self
    }

    pub fn extract(&self, raw_text: &str) -> ExtractedReport {
        let text = normalize_text(raw_text);
        let patient_name = self.names.extract(&text);
        let findings = FINDINGS.extract(&text).body;
        let impression = IMPRESSION.extract(&text).body;
        ExtractedReport {
            text,
            patient_name,
            findings,
            impression,
        }
    }
}
