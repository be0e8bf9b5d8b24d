//! Versioned chart schema registry.
//!
//! The schema is the single source of truth for the record shape: the
//! instruction text sent to the model is generated from it, and the
//! normalizer validates against the same definition, so the two can never
//! drift apart.

use serde_json::{Map, Value};

use super::ExtractionError;

/// Full first-visit chart for home-care intake from a referral letter.
pub const FIRST_VISIT_V1: &str = "first-visit/1";

/// SOAP-only record for spoken clinical dialogue transcripts.
pub const SOAP_V1: &str = "soap/1";

/// Marker character prefixed to every diagnosis entry, distinguishing a
/// diagnosis line from free text in downstream charts.
pub const DIAGNOSIS_MARKER: char = '#';

/// Structural type of a chart field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Scalar string; "" when unknown.
    Text,
    /// List of strings; [] when unknown.
    TextList,
    /// Nested object with its own declared fields.
    Object(&'static [FieldSpec]),
}

/// One declared field of a chart schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// A registered chart schema version.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub version: &'static str,
    pub fields: &'static [FieldSpec],
    /// Top-level list fields whose entries must carry [`DIAGNOSIS_MARKER`].
    pub marker_fields: &'static [&'static str],
    /// Per-section extraction guidance appended to the generated instruction.
    pub guidance: &'static str,
}

const fn text(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Text,
    }
}

const fn list(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::TextList,
    }
}

const fn object(name: &'static str, fields: &'static [FieldSpec]) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Object(fields),
    }
}

const PATIENT_INFO: &[FieldSpec] = &[
    text("name"),
    text("birth_date"),
    text("age"),
    text("gender"),
];

const VITALS: &[FieldSpec] = &[
    text("height"),
    text("weight"),
    text("blood_pressure"),
    text("pulse"),
    text("temperature"),
    text("spo2"),
];

const SOAP_OBJECTIVE: &[FieldSpec] = &[
    text("consciousness"),
    text("general_condition"),
    text("physical_exam"),
    text("test_results"),
];

const SOAP: &[FieldSpec] = &[
    text("subjective"),
    object("objective", SOAP_OBJECTIVE),
    text("assessment"),
    text("plan"),
];

const CLINICAL_COURSE: &[FieldSpec] = &[
    text("onset_and_progress"),
    text("reason_for_referral"),
    text("recent_changes"),
];

const ALLERGIES: &[FieldSpec] = &[
    text("drug_allergies"),
    text("food_allergies"),
    text("asthma"),
];

const LIFESTYLE: &[FieldSpec] = &[text("smoking"), text("alcohol"), text("occupation")];

const ADL: &[FieldSpec] = &[
    text("walking"),
    text("feeding"),
    text("excretion"),
    text("bathing"),
    text("dressing"),
    text("daily_activities"),
    text("iadl"),
];

const COGNITIVE_STATUS: &[FieldSpec] = &[
    text("dementia_presence"),
    text("dementia_type"),
    text("severity"),
    text("mmse_score"),
    text("behavioral_symptoms"),
];

const KEY_PERSON: &[FieldSpec] = &[text("name"), text("relation"), text("contact")];

const CARE_INFO: &[FieldSpec] = &[
    text("care_level"),
    text("disability_certification"),
    text("family_structure"),
    object("key_person", KEY_PERSON),
    text("preferred_location"),
    list("care_services"),
];

const ADVANCE_CARE_PLANNING: &[FieldSpec] = &[
    text("emergency_response"),
    text("life_sustaining_treatment"),
    text("tube_feeding"),
    text("acute_illness_treatment"),
    text("hospitalization_preference"),
    text("dnr_status"),
    text("organ_donation"),
    text("brain_bank"),
    text("other_wishes"),
];

const FIRST_VISIT_FIELDS: &[FieldSpec] = &[
    object("patient_info", PATIENT_INFO),
    object("vitals", VITALS),
    object("soap", SOAP),
    list("diagnosis"),
    object("clinical_course", CLINICAL_COURSE),
    list("past_medical_history"),
    object("allergies", ALLERGIES),
    text("adverse_drug_reactions"),
    object("lifestyle", LIFESTYLE),
    text("infectious_disease"),
    object("adl", ADL),
    text("independence_level"),
    object("cognitive_status", COGNITIVE_STATUS),
    object("care_info", CARE_INFO),
    object("advance_care_planning", ADVANCE_CARE_PLANNING),
    list("current_medications"),
    list("prn_medications"),
    text("treatment_plan"),
];

const SOAP_ONLY_FIELDS: &[FieldSpec] = &[
    text("subjective"),
    text("objective"),
    text("assessment"),
    text("plan"),
];

const FIRST_VISIT_GUIDANCE: &str = "\
- patient_info: name, birth date, age, gender as written.
- vitals: height, weight, blood pressure, pulse, temperature, SpO2.
- soap: S = chief complaint and what the patient/family report; \
O = consciousness level (alert, drowsy, ...), general condition, physical \
exam findings (heart/lung sounds, abdomen), and test results (ECG, imaging, \
bloodwork); A = diagnostic assessment; P = treatment plan and referral intent.
- diagnosis: every diagnosis named in the letter, main diagnosis first.
- clinical_course: when symptoms began and how they progressed, why the \
referral was made now, and any recent changes.
- past_medical_history: prior illnesses and surgeries, one entry each.
- allergies: distinguish 'none' from 'unknown' for drug, food, and asthma.
- lifestyle: smoking (amount x years), alcohol (kind and amount), occupation.
- adl: walking (independent / cane / walker / wheelchair / bedridden), and \
feeding, excretion, bathing, dressing as independent / partial assist / full \
assist; iadl covers instrumental activities.
- independence_level: bedridden rank (J1, A1, B1, ...) if stated.
- cognitive_status: dementia presence and type, severity, MMSE score \
(e.g. \"16/30\"), and behavioral symptoms (BPSD).
- care_info: certified care level, disability certification, family \
structure, key person, preferred place of care, and care services in use.
- advance_care_planning: emergency response, life-sustaining treatment, \
tube feeding, treatment of reversible acute illness, hospitalization \
preference, DNR status, organ donation, brain bank, other wishes.
- current_medications / prn_medications: drug name, dose, and directions; \
include the trigger condition for PRN drugs.
- treatment_plan: planned treatment, observation points, scheduled tests.";

const SOAP_GUIDANCE: &str = "\
- subjective: chief complaint and what the patient or family report.
- objective: physical findings, vital signs, test results.
- assessment: diagnosis and clinical evaluation.
- plan: treatment plan, prescriptions, next steps.
The dialogue may mix physician, patient, and family speech; keep only what \
belongs in a clinical record, stated concisely.";

/// All registered schema versions.
const REGISTRY: &[Schema] = &[
    Schema {
        version: FIRST_VISIT_V1,
        fields: FIRST_VISIT_FIELDS,
        marker_fields: &["diagnosis"],
        guidance: FIRST_VISIT_GUIDANCE,
    },
    Schema {
        version: SOAP_V1,
        fields: SOAP_ONLY_FIELDS,
        marker_fields: &[],
        guidance: SOAP_GUIDANCE,
    },
];

/// Look up a registered schema by version string.
pub fn get_schema(version: &str) -> Result<&'static Schema, ExtractionError> {
    REGISTRY
        .iter()
        .find(|s| s.version == version)
        .ok_or_else(|| ExtractionError::UnknownSchemaVersion(version.to_string()))
}

/// Canonical empty placeholder for a field kind: "" for text, [] for lists,
/// and a fully populated object of placeholders for nested objects.
pub fn default_value_for(kind: FieldKind) -> Value {
    match kind {
        FieldKind::Text => Value::String(String::new()),
        FieldKind::TextList => Value::Array(Vec::new()),
        FieldKind::Object(fields) => Value::Object(skeleton_of(fields)),
    }
}

fn skeleton_of(fields: &'static [FieldSpec]) -> Map<String, Value> {
    fields
        .iter()
        .map(|f| (f.name.to_string(), default_value_for(f.kind)))
        .collect()
}

impl Schema {
    /// Empty-record object with every declared field at its placeholder.
    /// Used both in the generated instruction text and for backfill.
    pub fn skeleton(&self) -> Value {
        Value::Object(skeleton_of(self.fields))
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_versions_registered() {
        assert!(get_schema(FIRST_VISIT_V1).is_ok());
        assert!(get_schema(SOAP_V1).is_ok());
    }

    #[test]
    fn unknown_version_rejected() {
        let err = get_schema("first-visit/99").unwrap_err();
        assert!(matches!(err, ExtractionError::UnknownSchemaVersion(v) if v == "first-visit/99"));
    }

    #[test]
    fn defaults_match_kinds() {
        assert_eq!(default_value_for(FieldKind::Text), Value::String("".into()));
        assert_eq!(default_value_for(FieldKind::TextList), Value::Array(vec![]));
        let obj = default_value_for(FieldKind::Object(KEY_PERSON));
        assert_eq!(obj["name"], Value::String("".into()));
        assert_eq!(obj["relation"], Value::String("".into()));
        assert_eq!(obj["contact"], Value::String("".into()));
    }

    #[test]
    fn first_visit_skeleton_covers_all_fields() {
        let schema = get_schema(FIRST_VISIT_V1).unwrap();
        let skeleton = schema.skeleton();
        let obj = skeleton.as_object().unwrap();
        assert_eq!(obj.len(), schema.fields.len());
        // Nested placeholders are fully expanded, two levels deep.
        assert_eq!(skeleton["soap"]["objective"]["consciousness"], "");
        assert_eq!(skeleton["care_info"]["key_person"]["name"], "");
        assert_eq!(skeleton["care_info"]["care_services"], Value::Array(vec![]));
        assert_eq!(skeleton["diagnosis"], Value::Array(vec![]));
    }

    #[test]
    fn soap_schema_is_flat() {
        let schema = get_schema(SOAP_V1).unwrap();
        assert_eq!(schema.fields.len(), 4);
        assert!(schema
            .fields
            .iter()
            .all(|f| matches!(f.kind, FieldKind::Text)));
        assert!(schema.marker_fields.is_empty());
    }

    #[test]
    fn diagnosis_is_a_marker_field() {
        let schema = get_schema(FIRST_VISIT_V1).unwrap();
        assert_eq!(schema.marker_fields, ["diagnosis"]);
        assert!(matches!(
            schema.field("diagnosis").unwrap().kind,
            FieldKind::TextList
        ));
    }
}
