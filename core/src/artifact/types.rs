use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};

/// Field names of an artifact record, in the order the protocol declares them.
pub const EXPECTED_KEYS: [&str; 5] = ["response", "status", "result", "app_type", "path"];

/// A generic key/value literal as written by the completion source. Maps keep
/// their entry order (and duplicates) so validation can report on them.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Number(String),
    Bool(bool),
    Null,
    List(Vec<Literal>),
    Map(Vec<(String, Literal)>),
}

impl Literal {
    pub fn from_json(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Literal::Null,
            Value::Bool(b) => Literal::Bool(b),
            Value::Number(n) => Literal::Number(n.to_string()),
            Value::String(s) => Literal::Str(s),
            Value::Array(items) => Literal::List(items.into_iter().map(Self::from_json).collect()),
            Value::Object(map) => Literal::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Scalar values as text; containers and null have no text form.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Literal::Str(s) => Some(s.clone()),
            Literal::Number(n) => Some(n.clone()),
            Literal::Bool(b) => Some(b.to_string()),
            Literal::Null | Literal::List(_) | Literal::Map(_) => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Literal> {
        match self {
            Literal::Map(entries) => entries.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl Serialize for Literal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Literal::Str(s) => serializer.serialize_str(s),
            Literal::Number(n) => match n.parse::<serde_json::Number>() {
                Ok(num) => num.serialize(serializer),
                Err(_) => serializer.serialize_str(n),
            },
            Literal::Bool(b) => serializer.serialize_bool(*b),
            Literal::Null => serializer.serialize_unit(),
            Literal::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Literal::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// `{"name": {"response": ..., ...}}` fragment.
    Structured,
    /// `~File_Name:x~` marker followed by a fenced block.
    Fenced,
    /// The whole raw text, kept when nothing else was found.
    Unstructured,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CandidateBody {
    /// A mapping of fields, not yet checked against the schema.
    Record(Vec<(String, Literal)>),
    /// The name mapped to something that is not a mapping.
    Malformed(Literal),
    /// Pass-through free text.
    Blob(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactCandidate {
    pub name: String,
    pub body: CandidateBody,
    pub encoding: Encoding,
}

impl ArtifactCandidate {
    /// True for candidates found through one of the two artifact encodings.
    pub fn is_encoded(&self) -> bool {
        self.encoding != Encoding::Unstructured
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    PendingValidation,
    StructureValid,
    StructureInvalid,
}

/// A validated artifact ready for the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    pub content: String,
    pub status: ArtifactStatus,
    pub result: String,
    /// Lowercase interpreter or storage class.
    pub app_type: String,
    /// Relative output subdirectory, possibly empty.
    pub path: String,
}

/// A candidate that failed structural validation, with the offending
/// mapping and the diagnostics explaining why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidArtifact {
    pub name: String,
    pub original: Literal,
    pub status: ArtifactStatus,
    pub result: String,
    pub diagnostics: Vec<String>,
}

impl InvalidArtifact {
    /// Best-effort artifact from whatever fields the candidate did carry.
    /// Needs at least textual `response` content.
    pub fn salvage(&self) -> Option<Artifact> {
        let content = self.original.get("response")?.as_text()?;
        let text_or = |key: &str, default: &str| {
            self.original
                .get(key)
                .and_then(Literal::as_text)
                .unwrap_or_else(|| default.to_string())
        };
        Some(Artifact {
            name: self.name.clone(),
            content: content.trim().to_string(),
            status: ArtifactStatus::StructureInvalid,
            result: self.result.clone(),
            app_type: text_or("app_type", "text").trim().to_lowercase(),
            path: text_or("path", ""),
        })
    }
}
