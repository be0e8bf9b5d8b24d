//! Response normalizer: raw model text → schema-valid [`ClinicalRecord`].
//!
//! The model is instructed to reply with bare JSON, but compliance is not
//! guaranteed: fences appear despite the instruction, empty sections get
//! omitted, and scalars and one-element lists are mixed inconsistently.
//! Normalization absorbs all of that; only genuinely ambiguous shapes are
//! rejected.

use serde_json::{Map, Value};

use super::schema::{FieldKind, FieldSpec, Schema, DIAGNOSIS_MARKER};
use super::types::ClinicalRecord;
use super::ExtractionError;

/// Turn the model's raw reply into a fully populated record.
///
/// Either every declared field comes back with the correct structural shape,
/// or an error carrying the raw text — never a partial record.
pub fn normalize_response(
    schema: &'static Schema,
    raw: &str,
) -> Result<ClinicalRecord, ExtractionError> {
    let stripped = strip_fences(raw);

    let parsed: Value = serde_json::from_str(stripped).map_err(|e| {
        ExtractionError::MalformedResponse {
            detail: e.to_string(),
            raw: raw.to_string(),
        }
    })?;

    let Value::Object(object) = parsed else {
        return Err(ExtractionError::MalformedResponse {
            detail: "top-level value is not a JSON object".into(),
            raw: raw.to_string(),
        });
    };

    let mut fields = conform_object(schema.fields, object, "", raw)?;
    for field in schema.marker_fields {
        if let Some(Value::Array(entries)) = fields.get_mut(*field) {
            apply_marker(entries);
        }
    }

    Ok(ClinicalRecord::new(schema.version, fields))
}

/// Strip at most one leading and one trailing Markdown code-fence token.
/// Fences appearing mid-string are left alone. Idempotent: the stripped
/// result is kept only when it no longer starts or ends with a fence token,
/// so degenerate inputs with stacked fences pass through unchanged and fail
/// at the JSON parse instead.
pub fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let mut text = trimmed;
    if let Some(rest) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    let text = text.trim();
    if text.starts_with("```") || text.ends_with("```") {
        return trimmed;
    }
    text
}

/// Conform a parsed object to the declared fields: backfill what is absent,
/// coerce what is close, reject what is ambiguous. Unknown keys are dropped.
fn conform_object(
    specs: &'static [FieldSpec],
    mut object: Map<String, Value>,
    path: &str,
    raw: &str,
) -> Result<Map<String, Value>, ExtractionError> {
    let mut out = Map::with_capacity(specs.len());

    for spec in specs {
        let field_path = join_path(path, spec.name);
        match object.remove(spec.name) {
            None | Some(Value::Null) => {
                out.insert(
                    spec.name.to_string(),
                    super::schema::default_value_for(spec.kind),
                );
            }
            Some(value) => {
                out.insert(spec.name.to_string(), conform_value(spec, value, &field_path, raw)?);
            }
        }
    }

    if !object.is_empty() {
        let at = if path.is_empty() { "<root>" } else { path };
        tracing::debug!(
            path = %at,
            dropped = object.len(),
            "Dropping undeclared keys from model response"
        );
    }

    Ok(out)
}

fn conform_value(
    spec: &'static FieldSpec,
    value: Value,
    path: &str,
    raw: &str,
) -> Result<Value, ExtractionError> {
    match spec.kind {
        FieldKind::Text => coerce_text(value, path, raw),
        FieldKind::TextList => coerce_list(value, path, raw),
        FieldKind::Object(subfields) => match value {
            Value::Object(object) => Ok(Value::Object(conform_object(subfields, object, path, raw)?)),
            other => Err(violation(path, "object", &other, raw)),
        },
    }
}

/// Scalars that are trivially strings (numbers, booleans) are rendered as
/// text; lists and objects where a scalar was declared are ambiguous.
fn coerce_text(value: Value, path: &str, raw: &str) -> Result<Value, ExtractionError> {
    match value {
        Value::String(s) => Ok(Value::String(s)),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        other => Err(violation(path, "string", &other, raw)),
    }
}

/// A bare scalar where a list was declared is treated as a one-element list;
/// an empty string means an empty list. List elements follow text coercion,
/// except `null` entries, which are skipped the same way a `null` field is
/// treated as absent.
fn coerce_list(value: Value, path: &str, raw: &str) -> Result<Value, ExtractionError> {
    match value {
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                if item.is_null() {
                    continue;
                }
                let item_path = format!("{path}[{i}]");
                out.push(coerce_text(item, &item_path, raw)?);
            }
            Ok(Value::Array(out))
        }
        Value::String(s) if s.trim().is_empty() => Ok(Value::Array(Vec::new())),
        Value::String(s) => Ok(Value::Array(vec![Value::String(s)])),
        Value::Number(n) => Ok(Value::Array(vec![Value::String(n.to_string())])),
        other => Err(violation(path, "list of strings", &other, raw)),
    }
}

fn apply_marker(entries: &mut [Value]) {
    for entry in entries {
        if let Value::String(s) = entry {
            if !s.is_empty() && !s.starts_with(DIAGNOSIS_MARKER) {
                s.insert(0, DIAGNOSIS_MARKER);
            }
        }
    }
}

fn violation(path: &str, expected: &'static str, _got: &Value, raw: &str) -> ExtractionError {
    ExtractionError::SchemaViolation {
        field: path.to_string(),
        expected,
        raw: raw.to_string(),
    }
}

fn join_path(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}
