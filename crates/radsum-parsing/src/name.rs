use once_cell::sync::Lazy;
use regex::Regex;

/// Value returned when no labeled name can be found.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Longest accepted name, in characters.
pub const MAX_NAME_CHARS: usize = 80;

/// Label patterns, most specific first. Each captures the rest of the line
/// following the label and its colon/dash.
static NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)patient name[:\-]\s*(.+)",
        r"(?i)patient[:\-]\s*(.+)",
        r"(?i)name[:\-]\s*(.+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Two or more spaces, or "dob", start an unrelated trailing field.
/// "dob" is matched anywhere, so a surname like "Dobbs" is cut as well.
static TRAILING_FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s{2,}|dob").unwrap());

/// Outcome of applying one label pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldMatch {
    /// The label matched and the cleaned value passed the length rule.
    Found(String),
    /// The label matched but the cleaned value was empty or too long.
    Rejected(String),
    /// The label does not occur in the text.
    NotFound,
}

/// Best-effort extractor for the patient name of a report.
///
/// Patterns are tried in order. By default the first pattern that matches
/// anywhere decides the result: if its value is rejected the extractor gives
/// up instead of trying the less specific labels.
#[derive(Debug, Clone, Default)]
pub struct NameExtractor {
    fall_through: bool,
}

impl NameExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep trying the next label pattern when a match is rejected.
    pub fn with_fall_through(mut self, enabled: bool) -> Self {
        self.fall_through = enabled;
        self
    }

    /// Extract the name, or [`UNKNOWN_NAME`].
    pub fn extract(&self, text: &str) -> String {
        for pattern in NAME_PATTERNS.iter() {
            match match_label(pattern, text) {
                FieldMatch::Found(name) => return name,
                FieldMatch::Rejected(_) if !self.fall_through => break,
                FieldMatch::Rejected(_) | FieldMatch::NotFound => continue,
            }
        }
        UNKNOWN_NAME.to_string()
    }
}

/// Extract the patient name with the default extractor.
pub fn extract_patient_name(text: &str) -> String {
    NameExtractor::new().extract(text)
}

/// Apply a single label pattern to `text` (first occurrence only).
pub fn match_label(pattern: &Regex, text: &str) -> FieldMatch {
    let Some(caps) = pattern.captures(text) else {
        return FieldMatch::NotFound;
    };
    let captured = caps.get(1).map_or("", |m| m.as_str()).trim();
    let value = match TRAILING_FIELD.find(captured) {
        Some(m) => &captured[..m.start()],
        None => captured,
    }
    .trim();

    let len = value.chars().count();
    if len > 0 && len <= MAX_NAME_CHARS {
        FieldMatch::Found(value.to_string())
    } else {
        FieldMatch::Rejected(value.to_string())
    }
}
