pub mod client;
pub mod normalize;
pub mod orchestrator;
pub mod prompt;
pub mod request;
pub mod sanitize;
pub mod schema;
pub mod types;

pub use client::*;
pub use normalize::*;
pub use orchestrator::*;
pub use prompt::*;
pub use request::*;
pub use sanitize::*;
pub use schema::*;
pub use types::*;

use thiserror::Error;

/// Failure modes of the extraction pipeline.
///
/// Either a fully schema-conformant [`ClinicalRecord`](types::ClinicalRecord)
/// is produced or one of these is returned — there is no partial-success mode.
/// Response-validation variants carry the raw model text so an operator can
/// diagnose a model that ignored the JSON-only instruction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("no input artifacts supplied")]
    EmptyInput,

    #[error("unsupported artifact kind: {0}")]
    UnsupportedArtifactKind(String),

    #[error("unknown schema version: {0}")]
    UnknownSchemaVersion(String),

    /// Transport failure from the model client, surfaced unchanged.
    /// Retry policy, if any, belongs to the client — the core never retries.
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("malformed model response: {detail}")]
    MalformedResponse { detail: String, raw: String },

    #[error("schema violation at '{field}': expected {expected}")]
    SchemaViolation {
        field: String,
        expected: &'static str,
        raw: String,
    },
}
