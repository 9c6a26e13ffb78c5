use serde::Serialize;

use super::types::{
    Artifact, ArtifactCandidate, ArtifactStatus, CandidateBody, InvalidArtifact, Literal,
    EXPECTED_KEYS,
};

pub const UNSTRUCTURED_PATH: &str = "unstructured";

#[derive(Debug, Clone, Default, Serialize)]
pub struct Normalized {
    pub valid: Vec<Artifact>,
    pub errors: Vec<InvalidArtifact>,
}

/// Canonicalizes candidates into artifacts. Structural problems never stop
/// the batch; each bad candidate ends up in `errors` with its diagnostics.
pub fn normalize(candidates: Vec<ArtifactCandidate>) -> Normalized {
    let mut out = Normalized::default();

    for candidate in candidates {
        match candidate.body {
            CandidateBody::Blob(text) => out.valid.push(Artifact {
                name: candidate.name,
                content: text,
                status: ArtifactStatus::StructureValid,
                result: "in_progress".to_string(),
                app_type: "text".to_string(),
                path: UNSTRUCTURED_PATH.to_string(),
            }),
            CandidateBody::Malformed(value) => {
                let diagnostic = format!(
                    "Responses must be structured as ChatFrames. ie: {}",
                    expected_structure()
                );
                tracing::warn!(target: "chatops.artifact", artifact = %candidate.name, "{diagnostic}");
                out.errors.push(InvalidArtifact {
                    name: candidate.name,
                    original: value,
                    status: ArtifactStatus::StructureInvalid,
                    result: "invalid".to_string(),
                    diagnostics: vec![diagnostic],
                });
            }
            CandidateBody::Record(fields) => match validate_record(&fields) {
                Ok(artifact_fields) => {
                    tracing::debug!(target: "chatops.artifact", artifact = %candidate.name, "structure valid");
                    out.valid.push(artifact_fields.into_artifact(candidate.name));
                }
                Err(diagnostics) => {
                    for d in &diagnostics {
                        tracing::warn!(target: "chatops.artifact", artifact = %candidate.name, "{d}");
                    }
                    out.errors.push(InvalidArtifact {
                        name: candidate.name,
                        original: Literal::Map(fields),
                        status: ArtifactStatus::StructureInvalid,
                        result: "invalid".to_string(),
                        diagnostics,
                    });
                }
            },
        }
    }

    out
}

struct RecordFields {
    response: String,
    app_type: String,
    path: String,
}

impl RecordFields {
    fn into_artifact(self, name: String) -> Artifact {
        Artifact {
            name,
            content: self.response.trim().to_string(),
            status: ArtifactStatus::StructureValid,
            result: "in_progress".to_string(),
            app_type: self.app_type.trim().to_lowercase(),
            path: self.path.trim().to_string(),
        }
    }
}

fn expected_structure() -> String {
    let fields: Vec<String> = EXPECTED_KEYS.iter().map(|k| format!("'{k}': ''")).collect();
    format!("{{'FileName': {{{}}}}}", fields.join(", "))
}

fn validate_record(fields: &[(String, Literal)]) -> Result<RecordFields, Vec<String>> {
    let received: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
    let mut diagnostics = Vec::new();

    let mut seen: Vec<&str> = Vec::new();
    for key in &received {
        if !EXPECTED_KEYS.contains(key) {
            if !seen.contains(key) {
                diagnostics.push(format!(
                    "Output Error: Unexpected key: '{key}' is not a valid key. It must be removed."
                ));
            }
        } else if seen.contains(key) {
            diagnostics.push(format!(
                "Output Error: Duplicate key: '{key}' appears more than once."
            ));
        }
        seen.push(*key);
    }

    for expected in EXPECTED_KEYS {
        if !received.contains(&expected) {
            diagnostics.push(format!("Output Error: Missing key: '{expected}' is required."));
        }
    }

    let mut text = |key: &str| -> String {
        match fields.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v) {
            Some(value) => value.as_text().unwrap_or_else(|| {
                diagnostics.push(format!(
                    "Output Error: Invalid value for '{key}': expected a string."
                ));
                String::new()
            }),
            None => String::new(),
        }
    };
    let record = RecordFields {
        response: text("response"),
        app_type: text("app_type"),
        path: text("path"),
    };
    // status and result are overwritten on success but must still be scalars
    text("status");
    text("result");

    if diagnostics.is_empty() {
        return Ok(record);
    }

    let mut positional: Vec<String> = EXPECTED_KEYS
        .iter()
        .zip(received.iter())
        .filter(|(expected, got)| expected != got)
        .map(|(expected, got)| {
            format!(
                "Output Error: Incorrect key: '{got}' is not the correct field for this section. Did you mean '{expected}'?"
            )
        })
        .collect();
    positional.append(&mut diagnostics);
    Err(positional)
}
