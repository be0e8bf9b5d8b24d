//! Orchestrates the full extraction pipeline:
//! schema lookup → request build → model call → normalize.

use uuid::Uuid;

use super::client::ModelClient;
use super::normalize::normalize_response;
use super::request::build_request;
use super::schema::get_schema;
use super::types::{ClinicalRecord, InputArtifact, MergePolicy};
use super::ExtractionError;

/// Extraction entry point owning the model client handle.
///
/// Constructed once by the caller and injected wherever extractions run —
/// there is no process-wide client cache. Each [`extract`](Self::extract)
/// call is independent: one blocking model request, one record, no shared
/// state between calls.
pub struct ReferralExtractor {
    client: Box<dyn ModelClient + Send + Sync>,
    merge_policy: MergePolicy,
}

impl ReferralExtractor {
    pub fn new(client: Box<dyn ModelClient + Send + Sync>) -> Self {
        Self {
            client,
            merge_policy: MergePolicy::default(),
        }
    }

    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    /// Extract one chart record from a set of input artifacts.
    ///
    /// Transport errors from the model client surface unchanged; no retry is
    /// attempted here. Either a fully schema-conformant record comes back or
    /// an error — never a partial record.
    pub fn extract(
        &self,
        schema_version: &str,
        artifacts: &[InputArtifact],
    ) -> Result<ClinicalRecord, ExtractionError> {
        let request_id = Uuid::new_v4();
        let _span = tracing::info_span!(
            "extract",
            request_id = %request_id,
            schema_version,
            artifact_count = artifacts.len()
        )
        .entered();

        let schema = get_schema(schema_version)?;
        let request = build_request(schema, artifacts, self.merge_policy)?;
        let raw = self.client.send(&request.prompt, &request.parts)?;
        let record = normalize_response(schema, &raw)?;

        tracing::info!(request_id = %request_id, "Extraction complete");
        Ok(record)
    }
}
