//! Extraction request builder: schema + artifacts → one outbound request.

use super::prompt::render_instruction;
use super::sanitize::clean_artifact_text;
use super::schema::Schema;
use super::types::{BinaryPart, ExtractionRequest, InputArtifact, MergePolicy};
use super::ExtractionError;

/// Image mime types the model endpoint accepts. PDF pages are rendered to
/// one of these by the external decoder before they reach the core.
const SUPPORTED_IMAGE_MIME: &[&str] = &["image/png", "image/jpeg", "image/webp"];

/// Compose the single outbound request. Pure construction — no I/O.
///
/// Text and transcript artifacts are sanitized and inlined as tagged blocks
/// after the instruction; image artifacts become ordered binary parts.
pub fn build_request(
    schema: &'static Schema,
    artifacts: &[InputArtifact],
    merge: MergePolicy,
) -> Result<ExtractionRequest, ExtractionError> {
    if artifacts.is_empty() {
        return Err(ExtractionError::EmptyInput);
    }

    let mut prompt = render_instruction(schema, merge);
    let mut parts = Vec::new();

    for (index, artifact) in artifacts.iter().enumerate() {
        match artifact {
            InputArtifact::Image { mime_type, data } => {
                if !SUPPORTED_IMAGE_MIME.contains(&mime_type.as_str()) {
                    return Err(ExtractionError::UnsupportedArtifactKind(format!(
                        "image with mime type '{mime_type}'"
                    )));
                }
                parts.push(BinaryPart {
                    mime_type: mime_type.clone(),
                    data: data.clone(),
                });
            }
            InputArtifact::Text(text) => {
                prompt.push_str(&format!(
                    "\n<document index=\"{}\">\n{}\n</document>\n",
                    index + 1,
                    clean_artifact_text(text)
                ));
            }
            InputArtifact::AudioTranscript(text) => {
                prompt.push_str(&format!(
                    "\n<transcript index=\"{}\">\n{}\n</transcript>\n",
                    index + 1,
                    clean_artifact_text(text)
                ));
            }
        }
    }

    tracing::debug!(
        schema_version = schema.version,
        artifact_count = artifacts.len(),
        binary_parts = parts.len(),
        "Extraction request built"
    );

    Ok(ExtractionRequest {
        schema_version: schema.version,
        prompt,
        parts,
    })
}
