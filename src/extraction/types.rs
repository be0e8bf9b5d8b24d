use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// One unit of input evidence describing part or all of a patient's referral
/// record. Owned exclusively by the request that contains it; never shared or
/// mutated after creation.
#[derive(Debug, Clone)]
pub enum InputArtifact {
    /// Scanned page or photo. PDF pages arrive here pre-rendered by an
    /// external decoder — the core never sees raw PDF bytes.
    Image { mime_type: String, data: Vec<u8> },
    /// Raw referral text, e.g. pasted from an electronic chart.
    Text(String),
    /// Transcript of spoken clinical dialogue, produced by an external
    /// speech-to-text collaborator.
    AudioTranscript(String),
}

/// Binary attachment of the outbound model request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryPart {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// The single outbound request composed from a set of artifacts.
/// Immutable once built; one request yields exactly one [`ClinicalRecord`].
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub schema_version: &'static str,
    /// Instruction text with inlined text/transcript artifacts.
    pub prompt: String,
    /// Image artifacts, in input order.
    pub parts: Vec<BinaryPart>,
}

/// Conflict rule applied when multiple artifacts describe the same patient.
///
/// Expressed only through the instruction text — compliance depends on the
/// external model, so the policy is configurable rather than hard-coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Keep the most complete value when a field appears in several documents.
    #[default]
    PreferMostComplete,
    /// Keep the value from the earliest supplied document.
    PreferFirst,
}

/// A normalized, schema-valid chart record.
///
/// Every field declared by the active schema is present with the correct
/// structural shape, using explicit empty placeholders ("" / []) rather than
/// absence, so downstream rendering never branches on missing keys.
#[derive(Debug, Clone, PartialEq)]
pub struct ClinicalRecord {
    version: &'static str,
    fields: Map<String, Value>,
}

impl ClinicalRecord {
    pub(crate) fn new(version: &'static str, fields: Map<String, Value>) -> Self {
        Self { version, fields }
    }

    /// Version of the schema this record conforms to.
    pub fn schema_version(&self) -> &'static str {
        self.version
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_json(self) -> Value {
        Value::Object(self.fields)
    }
}

impl Serialize for ClinicalRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::schema::FIRST_VISIT_V1;

    #[test]
    fn record_serializes_as_plain_object() {
        let mut fields = Map::new();
        fields.insert("treatment_plan".into(), Value::String("観察継続".into()));
        let record = ClinicalRecord::new(FIRST_VISIT_V1, fields);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"treatment_plan": "観察継続"}));
        assert_eq!(record.schema_version(), FIRST_VISIT_V1);
    }

    #[test]
    fn merge_policy_defaults_to_most_complete() {
        assert_eq!(MergePolicy::default(), MergePolicy::PreferMostComplete);
    }
}
