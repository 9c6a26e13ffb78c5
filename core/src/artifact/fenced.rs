//! Annotated fenced-block encoding:
//!
//! ~~~text
//! ~Folder_Name:src~
//! ~File_Name:main~
//! ```python
//! print("hi")
//! ```
//! ~~~
//!
//! Each file-name marker is paired with the next fenced block in document
//! order. A folder marker applies to the next file emitted.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use super::types::{ArtifactCandidate, CandidateBody, Encoding, Literal};

static TOKENS: OnceLock<Regex> = OnceLock::new();

fn tokens() -> &'static Regex {
    TOKENS.get_or_init(|| {
        Regex::new(
            r"(?s)~(?P<kind>Folder_Name|File_Name):(?P<value>[^~\n]*)~|```(?P<tag>[^\s`]*)[^\n`]*\n(?P<body>.*?)```",
        )
        .expect("TOKENS is valid")
    })
}

static BLOCKS: OnceLock<Regex> = OnceLock::new();

fn blocks() -> &'static Regex {
    BLOCKS.get_or_init(|| {
        Regex::new(r"(?ms)^[ \t]*```[^\n`]*\n.*?^[ \t]*```").expect("BLOCKS is valid")
    })
}

/// Byte range of the first line-anchored fenced block at or after `from`.
/// Anchors are evaluated against the whole text, not the suffix.
pub(super) fn next_block(text: &str, from: usize) -> Option<Range<usize>> {
    blocks().find_at(text, from).map(|m| m.range())
}

pub fn extract_fenced(text: &str) -> Vec<ArtifactCandidate> {
    let mut out = Vec::new();
    let mut folder: Option<String> = None;
    let mut file: Option<String> = None;

    for caps in tokens().captures_iter(text) {
        if let Some(kind) = caps.name("kind") {
            let value = caps
                .name("value")
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            match kind.as_str() {
                "Folder_Name" => folder = Some(value),
                _ => {
                    if let Some(orphan) = file.replace(value) {
                        tracing::debug!(target: "chatops.artifact", file = %orphan, "file marker without a fenced block");
                    }
                }
            }
            continue;
        }

        let Some(name) = file.take() else {
            continue;
        };
        let tag = caps.name("tag").map(|m| m.as_str()).unwrap_or_default();
        let app_type = if tag.is_empty() {
            "text".to_string()
        } else {
            tag.to_lowercase()
        };
        let body = caps.name("body").map(|m| m.as_str()).unwrap_or_default();
        let path = folder.take().unwrap_or_else(|| ".".to_string());

        out.push(ArtifactCandidate {
            name,
            body: CandidateBody::Record(vec![
                ("response".into(), Literal::Str(body.trim().to_string())),
                ("status".into(), Literal::Str("pending_validation".into())),
                ("result".into(), Literal::Str(String::new())),
                ("app_type".into(), Literal::Str(app_type)),
                ("path".into(), Literal::Str(path)),
            ]),
            encoding: Encoding::Fenced,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a>(c: &'a ArtifactCandidate, key: &str) -> &'a str {
        match &c.body {
            CandidateBody::Record(fields) => fields
                .iter()
                .find(|(k, _)| k == key)
                .and_then(|(_, v)| match v {
                    Literal::Str(s) => Some(s.as_str()),
                    _ => None,
                })
                .unwrap(),
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn pairs_markers_with_next_block() {
        let text = "Here you go.\n~File_Name:Hello_World~\n```toml\nname = \"x\"\n```\n#~Folder_Name:scripts~\n~File_Name:Math2~\n```powershell\nGet-Date\n```\n";
        let found = extract_fenced(text);
        assert_eq!(found.len(), 2);

        assert_eq!(found[0].name, "Hello_World");
        assert_eq!(field(&found[0], "app_type"), "toml");
        assert_eq!(field(&found[0], "response"), "name = \"x\"");
        assert_eq!(field(&found[0], "path"), ".");

        assert_eq!(found[1].name, "Math2");
        assert_eq!(field(&found[1], "app_type"), "powershell");
        assert_eq!(field(&found[1], "path"), "scripts");
        assert_eq!(found[1].encoding, Encoding::Fenced);
    }

    #[test]
    fn blocks_without_marker_are_skipped() {
        let text = "```python\nprint(1)\n```\n~File_Name:b~\n```Python\nprint(2)\n```";
        let found = extract_fenced(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "b");
        assert_eq!(field(&found[0], "app_type"), "python");
        assert_eq!(field(&found[0], "response"), "print(2)");
    }

    #[test]
    fn next_block_needs_fences_at_line_start() {
        let text = "{'a': {'response': ```x```}}\n```json\n{\"k\": 1}\n```\ntail";
        let range = next_block(text, 0).unwrap();
        assert!(text[range.clone()].starts_with("```json"));
        assert!(text[range.clone()].ends_with("```"));
        assert_eq!(next_block(text, range.end), None);
    }

    #[test]
    fn untagged_block_is_text_and_folder_is_consumed() {
        let text = "~Folder_Name:docs~\n~File_Name:notes~\n```\nhello\n```\n~File_Name:more~\n```md\n# hi\n```";
        let found = extract_fenced(text);
        assert_eq!(field(&found[0], "app_type"), "text");
        assert_eq!(field(&found[0], "path"), "docs");
        assert_eq!(field(&found[1], "path"), ".");
    }
}
