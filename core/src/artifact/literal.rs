//! Permissive key/value literal parser.
//!
//! Completion sources rarely emit strict JSON: they mix single and double
//! quotes, use triple-quoted or backtick-fenced strings, leave trailing
//! commas and write `True`/`None`. This parser accepts all of that and is
//! only tried after a strict JSON parse has failed.

use thiserror::Error;

use super::types::Literal;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("literal parse error at offset {pos}: {message}")]
pub struct LiteralError {
    pub pos: usize,
    pub message: String,
}

pub fn parse_literal(text: &str) -> Result<Literal, LiteralError> {
    let mut parser = Parser {
        chars: text.chars().collect(),
        pos: 0,
    };
    parser.skip_ws();
    let value = parser.value()?;
    parser.skip_ws();
    while matches!(parser.peek(), Some(',') | Some(';')) {
        parser.pos += 1;
        parser.skip_ws();
    }
    if parser.pos < parser.chars.len() {
        return Err(parser.error("unexpected trailing characters"));
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn error(&self, message: &str) -> LiteralError {
        LiteralError {
            pos: self.pos,
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn starts_with(&self, pat: &str) -> bool {
        let mut idx = self.pos;
        for c in pat.chars() {
            if self.chars.get(idx) != Some(&c) {
                return false;
            }
            idx += 1;
        }
        true
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn value(&mut self) -> Result<Literal, LiteralError> {
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('{') => self.map(),
            Some('[') => self.list(),
            Some('"') | Some('\'') | Some('`') => self.string().map(Literal::Str),
            Some(c) if c == '-' || c.is_ascii_digit() => Ok(self.number()),
            Some(c) if is_word_char(c) => Ok(word_literal(self.word())),
            Some(c) => Err(self.error(&format!("unexpected character '{c}'"))),
        }
    }

    fn map(&mut self) -> Result<Literal, LiteralError> {
        self.pos += 1;
        let mut entries = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                None => return Err(self.error("unterminated mapping")),
                Some('}') => {
                    self.pos += 1;
                    return Ok(Literal::Map(entries));
                }
                Some(',') => {
                    self.pos += 1;
                    continue;
                }
                _ => {}
            }

            let key = self.key()?;
            self.skip_ws();
            if self.peek() != Some(':') {
                return Err(self.error("expected ':' after key"));
            }
            self.pos += 1;
            self.skip_ws();
            let value = self.value()?;
            entries.push((key, value));
        }
    }

    fn list(&mut self) -> Result<Literal, LiteralError> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                None => return Err(self.error("unterminated list")),
                Some(']') => {
                    self.pos += 1;
                    return Ok(Literal::List(items));
                }
                Some(',') => {
                    self.pos += 1;
                    continue;
                }
                _ => items.push(self.value()?),
            }
        }
    }

    fn key(&mut self) -> Result<String, LiteralError> {
        match self.peek() {
            Some('"') | Some('\'') | Some('`') => self.string(),
            Some(c) if is_word_char(c) => Ok(self.word()),
            _ => Err(self.error("expected a key")),
        }
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        for fence in ["```", "\"\"\"", "'''"] {
            if self.starts_with(fence) {
                return self.raw_until(fence);
            }
        }

        let quote = self.peek().ok_or_else(|| self.error("expected a string"))?;
        if quote == '`' {
            return self.raw_until("`");
        }
        self.pos += 1;

        let mut out = String::new();
        loop {
            let c = self.peek().ok_or_else(|| self.error("unterminated string"))?;
            self.pos += 1;
            match c {
                '\\' => {
                    let esc = self
                        .peek()
                        .ok_or_else(|| self.error("unterminated escape"))?;
                    self.pos += 1;
                    match esc {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '0' => out.push('\0'),
                        '\\' | '\'' | '"' | '/' | '`' => out.push(esc),
                        'u' => out.push(self.unicode_escape()?),
                        other => {
                            out.push('\\');
                            out.push(other);
                        }
                    }
                }
                c if c == quote => return Ok(out),
                c => out.push(c),
            }
        }
    }

    fn unicode_escape(&mut self) -> Result<char, LiteralError> {
        let end = self.pos + 4;
        if end > self.chars.len() {
            return Err(self.error("truncated unicode escape"));
        }
        let hex: String = self.chars[self.pos..end].iter().collect();
        let code = u32::from_str_radix(&hex, 16).map_err(|_| self.error("bad unicode escape"))?;
        self.pos = end;
        Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    /// Verbatim content up to the closing delimiter, no escapes.
    fn raw_until(&mut self, delim: &str) -> Result<String, LiteralError> {
        let start = self.pos;
        self.pos += delim.chars().count();
        let mut out = String::new();
        while self.pos < self.chars.len() {
            if self.starts_with(delim) {
                self.pos += delim.chars().count();
                return Ok(out);
            }
            out.push(self.chars[self.pos]);
            self.pos += 1;
        }
        self.pos = start;
        Err(self.error(&format!("unterminated {delim} string")))
    }

    fn number(&mut self) -> Literal {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        {
            self.pos += 1;
        }
        // "-x" or "1.2.3": keep whatever word follows and treat it as text.
        if self.peek().is_some_and(is_word_char) {
            self.pos = start;
            return Literal::Str(self.word());
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        if text.parse::<f64>().is_ok() {
            Literal::Number(text)
        } else {
            Literal::Str(text)
        }
    }

    fn word(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_word_char) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '#' | '+')
}

fn word_literal(word: String) -> Literal {
    match word.as_str() {
        "True" | "true" => Literal::Bool(true),
        "False" | "false" => Literal::Bool(false),
        "None" | "null" | "nil" => Literal::Null,
        _ => Literal::Str(word),
    }
}
