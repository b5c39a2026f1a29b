//! Recursive-descent parser for the TOML subset used in config files.
//!
//! The document is always table-shaped at the root. `[a.b]` section headers
//! select nested tables (created on first use), and subsequent `key = value`
//! pairs land in the selected table until the next header. `#` starts a
//! comment anywhere between tokens, never inside a string literal.
//!
//! Strings are verbatim: both `"` and `'` delimit, and no escape processing
//! happens between the quotes. Bare tokens are classified as boolean
//! (`true`/`false`), float (token contains `.`), or 64-bit integer; a token
//! that is none of these is an invalid value.

use crate::error::ParseError;
use crate::value::{Table, Value};

/// Parse a complete TOML document into its root table.
pub fn parse(input: &str) -> Result<Table, ParseError> {
    Parser::new(input).parse_document()
}

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Skip whitespace (including newlines) and `#` comments between tokens.
    fn skip_trivia(&mut self) {
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' | b'\r' | b'\n' => self.pos += 1,
                b'#' => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    /// Skip spaces and tabs only; used between a key, `=`, and its value.
    fn skip_spaces(&mut self) {
        while let Some(b' ' | b'\t') = self.peek() {
            self.pos += 1;
        }
    }

    fn parse_document(&mut self) -> Result<Table, ParseError> {
        let mut root = Table::new();
        let mut section: Vec<String> = Vec::new();

        loop {
            self.skip_trivia();
            if self.at_eof() {
                break;
            }
            if self.peek() == Some(b'[') {
                section = self.parse_section_header()?;
                // Create the section table even if it ends up empty.
                table_at(&mut root, &section, self.pos)?;
            } else {
                let (key, value) = self.parse_pair()?;
                let table = table_at(&mut root, &section, self.pos)?;
                table.insert(key, value);
            }
        }
        Ok(root)
    }

    /// `[a.b.c]` — read to the matching `]` on the same line and split the
    /// header text into a nested table path.
    fn parse_section_header(&mut self) -> Result<Vec<String>, ParseError> {
        let open = self.pos;
        self.pos += 1; // consume '['
        let start = self.pos;
        loop {
            match self.peek() {
                Some(b']') => break,
                Some(b'\n') | None => {
                    return Err(ParseError::syntax(open, "unterminated section header"));
                }
                Some(_) => self.pos += 1,
            }
        }
        let text = self.input[start..self.pos].trim();
        self.pos += 1; // consume ']'

        if text.is_empty() {
            return Err(ParseError::syntax(open, "empty section header"));
        }
        let mut path = Vec::new();
        for segment in text.split('.') {
            let segment = segment.trim();
            if segment.is_empty() {
                return Err(ParseError::syntax(open, "empty segment in section header"));
            }
            path.push(segment.to_string());
        }
        Ok(path)
    }

    /// `key = value` on a single line.
    fn parse_pair(&mut self) -> Result<(String, Value), ParseError> {
        let start = self.pos;
        loop {
            match self.peek() {
                Some(b'=') => break,
                Some(b'\n') | Some(b'#') | None => {
                    return Err(ParseError::syntax(start, "expected '=' after key"));
                }
                Some(_) => self.pos += 1,
            }
        }
        let key = self.input[start..self.pos].trim();
        if key.is_empty() {
            return Err(ParseError::syntax(start, "empty key"));
        }
        let key = key.to_string();
        self.pos += 1; // consume '='
        self.skip_spaces();
        match self.peek() {
            None | Some(b'\n') | Some(b'\r') | Some(b'#') => {
                Err(ParseError::syntax(self.pos, "missing value after '='"))
            }
            Some(_) => {
                let value = self.parse_value()?;
                Ok((key, value))
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        match self.peek() {
            Some(quote @ (b'"' | b'\'')) => self.parse_string(quote),
            Some(b'[') => self.parse_array(),
            _ => self.parse_bare_token(),
        }
    }

    /// Verbatim string: everything up to the matching quote, no escapes.
    fn parse_string(&mut self, quote: u8) -> Result<Value, ParseError> {
        let open = self.pos;
        self.pos += 1;
        let start = self.pos;
        loop {
            match self.peek() {
                Some(b) if b == quote => break,
                Some(_) => self.pos += 1,
                None => return Err(ParseError::syntax(open, "unterminated string")),
            }
        }
        let s = self.input[start..self.pos].to_string();
        self.pos += 1; // closing quote
        Ok(Value::String(s))
    }

    fn parse_array(&mut self) -> Result<Value, ParseError> {
        let open = self.pos;
        self.pos += 1; // consume '['
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Value::Array(items));
                }
                None => return Err(ParseError::syntax(open, "unterminated array")),
                Some(_) => {}
            }
            items.push(self.parse_value()?);
            self.skip_trivia();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Value::Array(items));
                }
                None => return Err(ParseError::syntax(open, "unterminated array")),
                Some(_) => {
                    return Err(ParseError::syntax(
                        self.pos,
                        "expected ',' or ']' in array",
                    ));
                }
            }
        }
    }

    /// Bare token: boolean literal, or numeric — `.` in the token selects
    /// float parsing, its absence selects 64-bit integer parsing.
    fn parse_bare_token(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' | b'\r' | b'\n' | b'#' | b',' | b']' => break,
                _ => self.pos += 1,
            }
        }
        let token = &self.input[start..self.pos];
        if token.is_empty() {
            return Err(ParseError::syntax(start, "expected a value"));
        }
        match token {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ if token.contains('.') => match token.parse::<f64>() {
                Ok(f) => Ok(Value::Float(f)),
                Err(_) => Err(ParseError::InvalidValue {
                    offset: start,
                    text: token.to_string(),
                }),
            },
            _ => match token.parse::<i64>() {
                Ok(i) => Ok(Value::Integer(i)),
                Err(_) => Err(ParseError::InvalidValue {
                    offset: start,
                    text: token.to_string(),
                }),
            },
        }
    }
}

/// Walk `path` from the root, creating intermediate tables as needed, and
/// return the table at the end of the path.
fn table_at<'t>(
    root: &'t mut Table,
    path: &[String],
    offset: usize,
) -> Result<&'t mut Table, ParseError> {
    let mut current = root;
    for segment in path {
        let entry = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Table(Table::new()));
        match entry {
            Value::Table(t) => current = t,
            other => {
                return Err(ParseError::syntax(
                    offset,
                    format!("section '{segment}' conflicts with a {}", other.type_name()),
                ));
            }
        }
    }
    Ok(current)
}
