//! Instruction text generation.
//!
//! The instruction is rendered from the registered schema rather than
//! hand-maintained: the JSON template embedded in the prompt is the same
//! skeleton the normalizer backfills from, so the shape the model is asked
//! for and the shape that is validated cannot diverge.

use super::schema::{Schema, DIAGNOSIS_MARKER};
use super::types::MergePolicy;

/// Render the full extraction instruction for one schema version.
pub fn render_instruction(schema: &Schema, merge: MergePolicy) -> String {
    let template = serde_json::to_string_pretty(&schema.skeleton())
        .unwrap_or_else(|_| schema.skeleton().to_string());

    let marker_rule = if schema.marker_fields.is_empty() {
        String::new()
    } else {
        format!(
            "- Prefix every entry of {} with \"{}\" (e.g. \"{}アルツハイマー型認知症\").\n",
            schema.marker_fields.join(", "),
            DIAGNOSIS_MARKER,
            DIAGNOSIS_MARKER,
        )
    };

    format!(
        "You are a home-care physician. Read the provided referral documents \
and produce the patient's intake record as JSON.\n\
\n\
## Rules\n\
- Respond with JSON only. Do not wrap the output in Markdown code fences.\n\
- Output every field of the template below. Use an empty string \"\" (or an \
empty list) when the document does not state a value — never omit a key.\n\
- Extract only what is explicitly written; never infer or add clinical \
opinion.\n\
- Preserve exact values (doses, scores, dates) verbatim.\n\
{marker_rule}\
- {merge_directive}\n\
\n\
## JSON template\n\
{template}\n\
\n\
## Field guidance\n\
{guidance}\n",
        marker_rule = marker_rule,
        merge_directive = merge_directive(merge),
        template = template,
        guidance = schema.guidance,
    )
}

/// Directive telling the model how to merge several documents describing the
/// same patient into one record.
pub fn merge_directive(merge: MergePolicy) -> &'static str {
    match merge {
        MergePolicy::PreferMostComplete => {
            "Merge all documents into a single record. If the same field is \
described in more than one document, keep the most complete value."
        }
        MergePolicy::PreferFirst => {
            "Merge all documents into a single record. If the same field is \
described in more than one document, keep the value from the earliest \
document."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::schema::{get_schema, FIRST_VISIT_V1, SOAP_V1};

    #[test]
    fn instruction_embeds_schema_template() {
        let schema = get_schema(FIRST_VISIT_V1).unwrap();
        let prompt = render_instruction(schema, MergePolicy::default());

        assert!(prompt.contains("\"patient_info\""));
        assert!(prompt.contains("\"advance_care_planning\""));
        assert!(prompt.contains("\"key_person\""));
        assert!(prompt.contains("JSON only"));
    }

    #[test]
    fn first_visit_instruction_states_marker_rule() {
        let schema = get_schema(FIRST_VISIT_V1).unwrap();
        let prompt = render_instruction(schema, MergePolicy::default());
        assert!(prompt.contains("Prefix every entry of diagnosis with \"#\""));
    }

    #[test]
    fn soap_instruction_has_no_marker_rule() {
        let schema = get_schema(SOAP_V1).unwrap();
        let prompt = render_instruction(schema, MergePolicy::default());
        assert!(!prompt.contains("Prefix every entry"));
        assert!(prompt.contains("\"subjective\""));
    }

    #[test]
    fn merge_directive_follows_policy() {
        assert!(merge_directive(MergePolicy::PreferMostComplete).contains("most complete value"));
        assert!(merge_directive(MergePolicy::PreferFirst).contains("earliest"));
    }

    #[test]
    fn guidance_is_appended() {
        let schema = get_schema(FIRST_VISIT_V1).unwrap();
        let prompt = render_instruction(schema, MergePolicy::default());
        assert!(prompt.contains("MMSE"));
        assert!(prompt.contains("bedridden"));
    }
}
