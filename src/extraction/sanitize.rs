// Clean text artifacts before they are inlined into the model prompt.
// Removes invisible Unicode, normalizes whitespace, caps length.

/// Maximum characters of a single text artifact inlined into the prompt.
const MAX_ARTIFACT_LENGTH: usize = 50_000;

/// Sanitize one text or transcript artifact for prompt inclusion.
/// Never logs content (PHI risk) — only counts.
pub fn clean_artifact_text(raw: &str) -> String {
    let visible = strip_invisible_chars(raw);
    let normalized = collapse_blank_runs(&visible);
    let trimmed = normalized.trim();

    if trimmed.chars().count() > MAX_ARTIFACT_LENGTH {
        tracing::warn!(
            limit = MAX_ARTIFACT_LENGTH,
            "Text artifact exceeds length cap, truncating"
        );
        return trimmed.chars().take(MAX_ARTIFACT_LENGTH).collect();
    }
    trimmed.to_string()
}

/// Drop zero-width/directional formatting characters and C0 controls that
/// could steer the model invisibly. Standard whitespace is preserved.
fn strip_invisible_chars(text: &str) -> String {
    text.chars()
        .filter(|c| match c {
            ' ' | '\n' | '\t' | '\r' => true,
            '\u{200B}'..='\u{200F}' => false,
            '\u{202A}'..='\u{202E}' => false,
            '\u{2060}'..='\u{2064}' => false,
            '\u{FEFF}' => false,
            c => !c.is_control(),
        })
        .collect()
}

/// Collapse runs of three or more newlines into a paragraph break.
fn collapse_blank_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newlines = 0usize;
    for c in text.chars() {
        if c == '\n' {
            newlines += 1;
            if newlines <= 2 {
                out.push(c);
            }
        } else {
            newlines = 0;
            out.push(c);
        }
    }
    out
}
