use once_cell::sync::Lazy;
use regex::Regex;

/// A named heading and the headings that terminate its section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpec {
    pub heading: &'static str,
    pub stop_headings: &'static [&'static str],
}

/// FINDINGS, bounded by the impression and any trailing sections.
pub const FINDINGS: SectionSpec = SectionSpec {
    heading: "findings",
    stop_headings: &["impression", "conclusion", "discussion", "report"],
};

/// IMPRESSION, bounded by trailing sections and by FINDINGS when the
/// impression comes first.
pub const IMPRESSION: SectionSpec = SectionSpec {
    heading: "impression",
    stop_headings: &["conclusion", "discussion", "report", "findings"],
};

/// A heading together with the body found under it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub body: Option<String>,
}

static FINDINGS_PATTERN: Lazy<SectionPattern> = Lazy::new(|| {
    SectionPattern::new(FINDINGS.heading, FINDINGS.stop_headings).unwrap()
});

static IMPRESSION_PATTERN: Lazy<SectionPattern> = Lazy::new(|| {
    SectionPattern::new(IMPRESSION.heading, IMPRESSION.stop_headings).unwrap()
});

impl SectionSpec {
    pub fn extract(&self, text: &str) -> Section {
        let body = if *self == FINDINGS {
            FINDINGS_PATTERN.find(text)
        } else if *self == IMPRESSION {
            IMPRESSION_PATTERN.find(text)
        } else {
            extract_section(text, self.heading, self.stop_headings)
        };
        Section {
            heading: self.heading.to_string(),
            body,
        }
    }
}

/// Compiled heading and stop-heading regexes for one section.
///
/// The heading must start a line. It may be preceded by a number such as
/// `1.` or `2)`, may carry a plural `s`, and may be followed by `:`, `-`,
/// `–`, `—` or `.`. Stop headings match anywhere, not only at line start.
#[derive(Debug, Clone)]
pub struct SectionPattern {
    heading: Regex,
    stops: Vec<Regex>,
}

impl SectionPattern {
    pub fn new(heading: &str, stop_headings: &[&str]) -> Result<Self, regex::Error> {
        let heading = Regex::new(&format!(
            r"(?im)^\s*(?:\d+\s*[.)])?\s*{}s?\b\s*[:\-–—.]?",
            regex::escape(heading)
        ))?;
        let stops = stop_headings
            .iter()
            .map(|kw| Regex::new(&format!(r"(?i)\b{}s?\b\s*[:\-–—.]?", regex::escape(kw))))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { heading, stops })
    }

    /// Body of the section in `text`: from the end of the heading to the
    /// earliest stop heading after it, or to the end of the text.
    ///
    /// Returns `None` when the heading is absent or the body is blank.
    pub fn find(&self, text: &str) -> Option<String> {
        if text.is_empty() {
            return None;
        }

        let start = self.heading.find(text)?.end();
        let rest = &text[start..];

        let end = self
            .stops
            .iter()
            .filter_map(|re| re.find(rest).map(|m| start + m.start()))
            .min()
            .unwrap_or(text.len());

        let body = text[start..end].trim();
        if body.is_empty() {
            None
        } else {
            Some(body.to_string())
        }
    }
}

/// Extract the body of the section introduced by `heading`, compiling the
/// patterns for this call. See [`SectionPattern`] for the matching rules.
pub fn extract_section(text: &str, heading: &str, stop_headings: &[&str]) -> Option<String> {
    SectionPattern::new(heading, stop_headings).ok()?.find(text)
}

/// Extract the FINDINGS section.
pub fn extract_findings_section(text: &str) -> Option<String> {
    FINDINGS.extract(text).body
}

/// Extract the IMPRESSION section.
pub fn extract_impression_section(text: &str) -> Option<String> {
    IMPRESSION.extract(text).body
}
