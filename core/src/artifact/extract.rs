use super::fenced::extract_fenced;
use super::literal::parse_literal;
use super::scan::scan_fragments;
use super::types::{ArtifactCandidate, CandidateBody, Encoding, Literal};

/// Finds artifact candidates in a raw completion.
///
/// Structured fragments come first, then annotated fenced blocks. When
/// neither encoding yields anything, non-blank text is kept as a single
/// unstructured candidate.
pub fn extract(raw: &str) -> Vec<ArtifactCandidate> {
    let mut out = extract_structured(raw);
    let structured = out.len();
    out.extend(extract_fenced(raw));

    tracing::info!(
        target: "chatops.artifact",
        structured,
        fenced = out.len() - structured,
        "parsed output(s)"
    );

    if out.is_empty() && !raw.trim().is_empty() {
        tracing::warn!(target: "chatops.artifact", len = raw.len(), "no artifact encoding found, keeping raw text");
        out.push(ArtifactCandidate {
            name: String::new(),
            body: CandidateBody::Blob(raw.to_string()),
            encoding: Encoding::Unstructured,
        });
    }

    out
}

fn extract_structured(raw: &str) -> Vec<ArtifactCandidate> {
    scan_fragments(raw, parse_fragment)
        .into_iter()
        .flatten()
        .map(|(name, value)| {
            let body = match value {
                Literal::Map(fields) => CandidateBody::Record(fields),
                other => CandidateBody::Malformed(other),
            };
            ArtifactCandidate {
                name,
                body,
                encoding: Encoding::Structured,
            }
        })
        .collect()
}

/// Entries of a mapping fragment: strict JSON first, then the permissive
/// literal parser. Rejected fragments are rescanned by the caller, so the
/// text they cover is not lost yet.
fn parse_fragment(fragment: &str) -> Option<Vec<(String, Literal)>> {
    let parsed = match serde_json::from_str::<serde_json::Value>(fragment) {
        Ok(value) => Literal::from_json(value),
        Err(_) => match parse_literal(fragment) {
            Ok(lit) => lit,
            Err(e) => {
                tracing::warn!(
                    target: "chatops.artifact",
                    error = %e,
                    preview = %preview(fragment),
                    "fragment is not a mapping, rescanning"
                );
                return None;
            }
        },
    };
    match parsed {
        Literal::Map(entries) => Some(entries),
        _ => None,
    }
}

fn preview(fragment: &str) -> String {
    const MAX: usize = 80;
    match fragment.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &fragment[..idx]),
        None => fragment.to_string(),
    }
}
