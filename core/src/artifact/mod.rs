//! Artifact extraction and validation.
//!
//! A raw completion is scanned for the two artifact encodings (structured
//! fragments and annotated fenced blocks), each candidate is checked against
//! the record schema, and the survivors become [`Artifact`]s.

mod extract;
mod fenced;
mod literal;
mod scan;
mod types;
mod validate;

pub use extract::extract;
pub use fenced::extract_fenced;
pub use literal::{parse_literal, LiteralError};
pub use scan::scan_fragments;
pub use types::{
    Artifact, ArtifactCandidate, ArtifactStatus, CandidateBody, Encoding, InvalidArtifact,
    Literal, EXPECTED_KEYS,
};
pub use validate::{normalize, Normalized, UNSTRUCTURED_PATH};
