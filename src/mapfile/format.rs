// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The textual mapfile format.
//!
//! Mapfiles are written the way the LOFAR pipeline framework writes them: a
//! Python-literal list of dictionaries, e.g.
//!
//! ```text
//! [{'host': 'localhost', 'file': '/data/L1_SB000.ms', 'skip': False}]
//! ```
//!
//! Keys may come in any order when reading, but all three must be present.

use itertools::Itertools;

use super::DataProduct;

pub(super) struct FormatError {
    pub(super) pos: usize,
    pub(super) reason: String,
}

pub(super) fn serialise(products: &[DataProduct]) -> String {
    format!(
        "[{}]",
        products
            .iter()
            .map(|p| format!(
                "{{'host': {}, 'file': {}, 'skip': {}}}",
                quote(&p.host),
                quote(&p.file),
                if p.skip { "True" } else { "False" }
            ))
            .join(", ")
    )
}

/// Quote a string like Python's `repr` does.
fn quote(s: &str) -> String {
    let q = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(q);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == q => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(q);
    out
}

pub(super) fn parse(s: &str) -> Result<Vec<DataProduct>, FormatError> {
    let mut parser = Parser {
        chars: s.chars().collect(),
        pos: 0,
    };
    let products = parser.list()?;
    parser.skip_whitespace();
    if parser.pos != parser.chars.len() {
        return Err(parser.error("trailing characters after the closing ']'"));
    }
    Ok(products)
}

enum Value {
    Str(String),
    Bool(bool),
    Number(String),
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn error<S: Into<String>>(&self, reason: S) -> FormatError {
        FormatError {
            pos: self.pos,
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), FormatError> {
        self.skip_whitespace();
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{expected}', found '{c}'"))),
            None => Err(self.error(format!("expected '{expected}', found end of input"))),
        }
    }

    /// Consume a ',' if present, then report whether `close` follows.
    fn separator_or_close(&mut self, close: char) -> Result<bool, FormatError> {
        self.skip_whitespace();
        match self.peek() {
            Some(',') => {
                self.pos += 1;
                self.skip_whitespace();
                if self.peek() == Some(close) {
                    self.pos += 1;
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Some(c) if c == close => {
                self.pos += 1;
                Ok(true)
            }
            Some(c) => Err(self.error(format!("expected ',' or '{close}', found '{c}'"))),
            None => Err(self.error(format!("expected ',' or '{close}', found end of input"))),
        }
    }

    fn list(&mut self) -> Result<Vec<DataProduct>, FormatError> {
        self.expect('[')?;
        let mut products = vec![];
        self.skip_whitespace();
        if self.peek() == Some(']') {
            self.pos += 1;
            return Ok(products);
        }
        loop {
            products.push(self.record()?);
            if self.separator_or_close(']')? {
                return Ok(products);
            }
        }
    }

    fn record(&mut self) -> Result<DataProduct, FormatError> {
        self.expect('{')?;
        let start = self.pos;
        let mut host = None;
        let mut file = None;
        let mut skip = None;
        self.skip_whitespace();
        if self.peek() != Some('}') {
            loop {
                self.skip_whitespace();
                let key = match self.value()? {
                    Value::Str(k) => k,
                    _ => return Err(self.error("record keys must be strings")),
                };
                self.expect(':')?;
                let value = self.value()?;
                match (key.as_str(), value) {
                    ("host", Value::Str(h)) => host = Some(h),
                    ("file", Value::Str(f)) => file = Some(f),
                    // Some tools write bare numbers (e.g. fractions) as the
                    // file.
                    ("file", Value::Number(n)) => file = Some(n),
                    ("skip", Value::Bool(b)) => skip = Some(b),
                    ("host" | "file" | "skip", _) => {
                        return Err(self.error(format!("wrong value type for key '{key}'")))
                    }
                    // Unknown keys are ignored.
                    _ => (),
                }
                if self.separator_or_close('}')? {
                    break;
                }
            }
        } else {
            self.pos += 1;
        }

        match (host, file, skip) {
            (Some(host), Some(file), Some(skip)) => Ok(DataProduct { host, file, skip }),
            (h, f, _) => {
                let missing = if h.is_none() {
                    "host"
                } else if f.is_none() {
                    "file"
                } else {
                    "skip"
                };
                Err(FormatError {
                    pos: start,
                    reason: format!("record is missing the '{missing}' key"),
                })
            }
        }
    }

    fn value(&mut self) -> Result<Value, FormatError> {
        self.skip_whitespace();
        match self.peek() {
            Some(q @ ('\'' | '"')) => {
                self.pos += 1;
                self.string(q).map(Value::Str)
            }
            Some(c) if c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '+' => {
                let start = self.pos;
                while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || "-+._".contains(c))
                {
                    self.pos += 1;
                }
                let word: String = self.chars[start..self.pos].iter().collect();
                match word.as_str() {
                    "True" => Ok(Value::Bool(true)),
                    "False" => Ok(Value::Bool(false)),
                    w if w.parse::<f64>().is_ok() => Ok(Value::Number(word)),
                    _ => Err(FormatError {
                        pos: start,
                        reason: format!("unexpected token '{word}'"),
                    }),
                }
            }
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    /// Read the rest of a quoted string; the opening quote has already been
    /// consumed.
    fn string(&mut self, quote: char) -> Result<String, FormatError> {
        let mut s = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some('\\') => {
                    self.pos += 1;
                    match self.peek() {
                        None => return Err(self.error("unterminated string")),
                        Some(c) => {
                            match c {
                                'n' => s.push('\n'),
                                'r' => s.push('\r'),
                                't' => s.push('\t'),
                                '\\' | '\'' | '"' => s.push(c),
                                // Python keeps unknown escapes verbatim.
                                _ => {
                                    s.push('\\');
                                    s.push(c);
                                }
                            }
                            self.pos += 1;
                        }
                    }
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(s);
                }
                Some(c) => {
                    s.push(c);
                    self.pos += 1;
                }
            }
        }
    }
}
