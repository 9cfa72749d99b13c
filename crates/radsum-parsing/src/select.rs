use std::fmt;

/// Which text was handed to the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectedSource {
    Findings,
    Impression,
    FullReport,
}

impl SelectedSource {
    /// Tag embedded in the classification prompt.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Findings => "findings",
            Self::Impression => "impression",
            Self::FullReport => "full_report",
        }
    }
}

impl fmt::Display for SelectedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The text chosen for classification and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedSection<'a> {
    pub text: &'a str,
    pub source: SelectedSource,
}

/// Pick FINDINGS, then IMPRESSION, then the whole normalized text.
pub fn select_section<'a>(
    findings: Option<&'a str>,
    impression: Option<&'a str>,
    full_text: &'a str,
) -> SelectedSection<'a> {
    if let Some(text) = findings {
        SelectedSection {
            text,
            source: SelectedSource::Findings,
        }
    } else if let Some(text) = impression {
        SelectedSection {
            text,
            source: SelectedSource::Impression,
        }
    } else {
        SelectedSection {
            text: full_text,
            source: SelectedSource::FullReport,
        }
    }
}
