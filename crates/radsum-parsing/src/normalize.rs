/// Canonicalize line endings and spacing artifacts left by PDF text extraction.
///
/// `\r\n` and bare `\r` become `\n`; non-breaking spaces become ordinary
/// spaces. Applying it twice is the same as applying it once.
pub fn normalize_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\u{00A0}', " ")
}
