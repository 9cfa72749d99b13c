use radsum_parsing::SelectedSource;

/// Build the classification prompt for one report section.
///
/// The prompt names the section source, describes the severity scale and
/// asks for a bare JSON object with `summary`, `severity_label` and
/// `severity_score`.
pub fn build_prompt(section_text: &str, source: SelectedSource) -> String {
    format!(
        r#"You are an experienced radiologist reviewing an MRI report.

The text below is one of:
- the FINDINGS section,
- the IMPRESSION section, or
- the full report text.

Source type: {source}

Instructions:

1. Read the text carefully.
2. Write a short, clinically accurate summary of 1-3 sentences covering the
   key abnormal findings and the overall severity.
3. Assign a severity label and a numeric score:

   - severity_label: one of
       "none/normal", "mild", "moderate", "severe", "uncertain"
   - severity_score: integer from 0 to 5
       0 = no abnormal findings
       1 = very mild / minimal
       2 = mild
       3 = moderate
       4 = marked / severe
       5 = very severe / critical

Reply with ONLY a JSON object using exactly this schema:

{{
  "summary": "<1-3 sentence summary>",
  "severity_label": "<none/normal | mild | moderate | severe | uncertain>",
  "severity_score": <integer 0-5>
}}

Describe imaging severity only. Do not include treatment recommendations or
follow-up plans.

Text:

"""{section_text}"""
"#,
        source = source.as_str(),
    )
}
