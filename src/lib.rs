//! karte — extraction core for converting medical referral letters into
//! structured first-visit chart records.
//!
//! The crate owns three responsibilities: the versioned chart schema registry,
//! building the single outbound model request from a set of input artifacts,
//! and normalizing the model's raw text reply into a schema-valid
//! [`ClinicalRecord`](extraction::ClinicalRecord). The model call itself goes
//! through the [`ModelClient`](extraction::ModelClient) trait; rendering,
//! file upload, and PDF/audio decoding live outside this crate.

pub mod extraction;

pub use extraction::{
    ClinicalRecord, ExtractionError, InputArtifact, MergePolicy, ModelClient, ModelError,
    ReferralExtractor,
};
