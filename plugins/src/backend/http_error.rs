use std::{error::Error as StdError, fmt};

use chatops_core::api::CompletionError;

pub(crate) const BODY_PREVIEW_LIMIT: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionHttpErrorKind {
    Timeout,
    Connect,
    Request,
    Body,
    Decode,
    Status,
    Empty,
    Unknown,
}

impl CompletionHttpErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::Decode => "decode",
            Self::Status => "status",
            Self::Empty => "empty",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CompletionHttpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct CompletionHttpError {
    kind: CompletionHttpErrorKind,
    status: Option<u16>,
    url: String,
    message: String,
    source: Option<anyhow::Error>,
}

impl CompletionHttpError {
    pub fn kind(&self) -> CompletionHttpErrorKind {
        self.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, url: String) -> Self {
        let kind = if err.is_timeout() {
            CompletionHttpErrorKind::Timeout
        } else if err.is_connect() {
            CompletionHttpErrorKind::Connect
        } else if err.is_request() {
            CompletionHttpErrorKind::Request
        } else if err.is_body() {
            CompletionHttpErrorKind::Body
        } else if err.is_decode() {
            CompletionHttpErrorKind::Decode
        } else {
            CompletionHttpErrorKind::Unknown
        };
        Self {
            kind,
            status: err.status().map(|s| s.as_u16()),
            url,
            message: err.to_string(),
            source: Some(anyhow::Error::new(err)),
        }
    }

    pub(crate) fn status_error(status: u16, url: String, preview: String) -> Self {
        Self {
            kind: CompletionHttpErrorKind::Status,
            status: Some(status),
            url,
            message: preview,
            source: None,
        }
    }

    pub(crate) fn decode_error(status: u16, url: String, err: serde_json::Error, preview: String) -> Self {
        Self {
            kind: CompletionHttpErrorKind::Decode,
            status: Some(status),
            url,
            message: format!("failed to decode response body: {} | body={}", err, preview),
            source: Some(anyhow::Error::new(err)),
        }
    }

    pub(crate) fn empty(status: u16, url: String) -> Self {
        Self {
            kind: CompletionHttpErrorKind::Empty,
            status: Some(status),
            url,
            message: "response carried no completion text".to_string(),
            source: None,
        }
    }

    /// Rate limits, timeouts, connection failures, server errors and garbled
    /// bodies are worth retrying; other client errors are not.
    pub fn is_transient(&self) -> bool {
        match self.kind {
            CompletionHttpErrorKind::Status => {
                matches!(self.status, Some(408 | 409 | 429) | Some(500..=599))
            }
            CompletionHttpErrorKind::Request => false,
            _ => true,
        }
    }
}

impl fmt::Display for CompletionHttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "completion http error kind={}", self.kind)?;
        if let Some(status) = self.status {
            write!(f, " status={}", status)?;
        }
        write!(f, " url={}: {}", self.url, self.message)
    }
}

impl StdError for CompletionHttpError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}

impl From<CompletionHttpError> for CompletionError {
    fn from(err: CompletionHttpError) -> Self {
        if err.is_transient() {
            CompletionError::Transient(err.to_string())
        } else {
            CompletionError::Permanent(err.to_string())
        }
    }
}

pub(crate) fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out: String = trimmed.chars().take(BODY_PREVIEW_LIMIT).collect();
    if trimmed.chars().count() > BODY_PREVIEW_LIMIT {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_body_empty_and_truncated() {
        assert_eq!(preview_body("   "), "<empty body>");
        let preview = preview_body(&"a".repeat(BODY_PREVIEW_LIMIT + 10));
        assert!(preview.ends_with("..."));
        assert_eq!(preview.len(), BODY_PREVIEW_LIMIT + 3);
    }

    #[test]
    fn status_classification() {
        let url = "https://example.com/chat/completions".to_string();
        for (status, transient) in [(429, true), (503, true), (500, true), (400, false), (401, false), (404, false)] {
            let err = CompletionHttpError::status_error(status, url.clone(), "x".into());
            assert_eq!(err.is_transient(), transient, "status {status}");
        }
    }

    #[test]
    fn display_carries_kind_status_and_url() {
        let err = CompletionHttpError::status_error(
            502,
            "https://example.com/chat/completions".to_string(),
            "bad gateway".to_string(),
        );
        let msg = err.to_string();
        assert!(msg.contains("kind=status"));
        assert!(msg.contains("status=502"));
        assert!(msg.contains("url=https://example.com/chat/completions"));
        assert!(msg.contains("bad gateway"));
        assert!(matches!(CompletionError::from(err), CompletionError::Transient(_)));
    }
}
