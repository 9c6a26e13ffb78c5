//! Brace-balanced fragment scanner for the structured encoding.
//!
//! Each `{` starts a candidate fragment. The balanced scan skips over quoted
//! and fenced strings so braces inside a `response` value do not end the
//! fragment. When the balanced scan runs off the end of the text (typically
//! an unbalanced quote), the fragment falls back to the shortest match ending
//! in `}}`.
//!
//! A fragment the caller rejects only consumes its opening brace, so a stray
//! `{` in prose cannot swallow a record that follows it. Braces inside
//! line-anchored fenced blocks never open a fragment.

use std::sync::OnceLock;

use regex::Regex;

use super::fenced::next_block;

static DOUBLE_CLOSE: OnceLock<Regex> = OnceLock::new();

fn double_close() -> &'static Regex {
    DOUBLE_CLOSE.get_or_init(|| Regex::new(r"(?s)^\{.+?\}\}").expect("DOUBLE_CLOSE is valid"))
}

/// Walks `text` in document order, handing every candidate `{...}` span to
/// `parse`. An accepted span is consumed whole; a rejected one is rescanned
/// from the character after its opening brace.
pub fn scan_fragments<'a, T>(text: &'a str, mut parse: impl FnMut(&'a str) -> Option<T>) -> Vec<T> {
    let mut out = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('{') {
        let start = pos + offset;
        if let Some(block) = next_block(text, pos).filter(|b| b.start <= start) {
            pos = block.end;
            continue;
        }

        let accepted = balanced_end(text, start)
            .or_else(|| double_close_end(text, start))
            .and_then(|end| parse(&text[start..end]).map(|value| (value, end)));
        match accepted {
            Some((value, end)) => {
                out.push(value);
                pos = end;
            }
            None => pos = start + 1,
        }
    }

    out
}

fn double_close_end(text: &str, start: usize) -> Option<usize> {
    double_close().find(&text[start..]).map(|m| start + m.end())
}

/// End offset (exclusive) of the balanced fragment opened at `start`.
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = start;

    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                depth += 1;
                i += 1;
            }
            b'}' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            b'`' | b'"' | b'\'' => i = skip_string(bytes, i)?,
            _ => i += 1,
        }
    }
    None
}

/// Index just past the string literal starting at `i`, or None if it never closes.
fn skip_string(bytes: &[u8], i: usize) -> Option<usize> {
    let quote = bytes[i];
    let triple = bytes.len() >= i + 3 && bytes[i + 1] == quote && bytes[i + 2] == quote;

    if triple {
        let delim = [quote; 3];
        let rest = &bytes[i + 3..];
        return rest
            .windows(3)
            .position(|w| w == delim)
            .map(|p| i + 3 + p + 3);
    }

    // Apostrophes inside bare words ("don't") are not string openers.
    if quote == b'\'' && i > 0 && bytes[i - 1].is_ascii_alphanumeric() {
        return Some(i + 1);
    }

    let mut j = i + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' if quote != b'`' => j += 2,
            b if b == quote => return Some(j + 1),
            _ => j += 1,
        }
    }
    None
}
