//! Recursive-descent parser for JSON with Comments.
//!
//! Standard JSON grammar, with two extensions: `//` line comments and
//! `/* */` block comments are allowed anywhere whitespace is, and a single
//! trailing comma is tolerated immediately before a closing `}` or `]`.
//! The root may be any JSON value type; the config loader separately
//! enforces a table root.
//!
//! Number scanning is deliberately two-phase: the scanner accepts any run of
//! digits, `.`, `e`/`E`, and sign characters without enforcing ordering, and
//! the run is validated only when handed to the integer or float converter.
//! A run containing `.`, `e`, or `E` converts as a float, anything else as a
//! 64-bit integer.

use crate::error::ParseError;
use crate::value::{Table, Value};

/// Parse a complete JSONC document. The root may be any value type.
pub fn parse(input: &str) -> Result<Value, ParseError> {
    let mut parser = Parser::new(input);
    parser.skip_trivia()?;
    let value = parser.parse_value()?;
    parser.skip_trivia()?;
    if !parser.at_eof() {
        return Err(ParseError::syntax(
            parser.pos,
            "unexpected content after the document root",
        ));
    }
    Ok(value)
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

    /// Skip whitespace, `//` line comments, and `/* */` block comments.
    /// An unterminated block comment exhausts the input.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r' | b'\n') => self.pos += 1,
                Some(b'/') => match self.bytes.get(self.pos + 1) {
                    Some(b'/') => {
                        self.pos += 2;
                        while let Some(b) = self.peek() {
                            if b == b'\n' {
                                break;
                            }
                            self.pos += 1;
                        }
                    }
                    Some(b'*') => {
                        self.pos += 2;
                        loop {
                            if self.at_eof() {
                                return Err(ParseError::UnexpectedEof { offset: self.pos });
                            }
                            if self.peek() == Some(b'*')
                                && self.bytes.get(self.pos + 1) == Some(&b'/')
                            {
                                self.pos += 2;
                                break;
                            }
                            self.pos += 1;
                        }
                    }
                    _ => return Err(ParseError::syntax(self.pos, "unexpected '/'")),
                },
                _ => return Ok(()),
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        match self.peek() {
            None => Err(ParseError::UnexpectedEof { offset: self.pos }),
            Some(b'{') => self.parse_object(),
            Some(b'[') => self.parse_array(),
            Some(b'"') => Ok(Value::String(self.parse_string()?)),
            Some(b't') => self.parse_literal("true", Value::Bool(true)),
            Some(b'f') => self.parse_literal("false", Value::Bool(false)),
            Some(b'n') => self.parse_literal("null", Value::Null),
            Some(_) => self.parse_number(),
        }
    }

    fn parse_literal(&mut self, text: &str, value: Value) -> Result<Value, ParseError> {
        if self.input[self.pos..].starts_with(text) {
            self.pos += text.len();
            Ok(value)
        } else {
            Err(ParseError::syntax(self.pos, "invalid literal"))
        }
    }

    /// Double-quoted string with the strict JSON escape set.
    fn parse_string(&mut self) -> Result<String, ParseError> {
        self.pos += 1; // opening quote
        let mut out = String::new();
        let mut run_start = self.pos;
        loop {
            match self.peek() {
                None => return Err(ParseError::UnexpectedEof { offset: self.pos }),
                Some(b'"') => {
                    out.push_str(&self.input[run_start..self.pos]);
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    out.push_str(&self.input[run_start..self.pos]);
                    let escape_pos = self.pos;
                    self.pos += 1;
                    let Some(b) = self.peek() else {
                        return Err(ParseError::UnexpectedEof { offset: self.pos });
                    };
                    let replacement = match b {
                        b'"' => '"',
                        b'\\' => '\\',
                        b'/' => '/',
                        b'b' => '\u{0008}',
                        b'f' => '\u{000C}',
                        b'n' => '\n',
                        b'r' => '\r',
                        b't' => '\t',
                        _ => {
                            // Report the actual character, which may be multi-byte.
                            let found = self.input[self.pos..]
                                .chars()
                                .next()
                                .unwrap_or('\u{FFFD}');
                            return Err(ParseError::InvalidEscape {
                                offset: escape_pos,
                                found,
                            });
                        }
                    };
                    out.push(replacement);
                    self.pos += 1;
                    run_start = self.pos;
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Permissive scan, strict conversion (see module docs).
    fn parse_number(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        while let Some(b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-') = self.peek() {
            self.pos += 1;
        }
        let token = &self.input[start..self.pos];
        if token.is_empty() {
            return Err(ParseError::syntax(start, "expected a value"));
        }
        convert_number(token, start)
    }

    fn parse_array(&mut self) -> Result<Value, ParseError> {
        self.pos += 1; // consume '['
        let mut items = Vec::new();
        self.skip_trivia()?;
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(Value::Array(items));
        }
        loop {
            self.skip_trivia()?;
            items.push(self.parse_value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_trivia()?;
                    // One trailing comma is allowed before the closer.
                    if self.peek() == Some(b']') {
                        self.pos += 1;
                        return Ok(Value::Array(items));
                    }
                }
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Value::Array(items));
                }
                None => return Err(ParseError::UnexpectedEof { offset: self.pos }),
                Some(_) => {
                    return Err(ParseError::syntax(self.pos, "expected ',' or ']'"));
                }
            }
        }
    }

    fn parse_object(&mut self) -> Result<Value, ParseError> {
        self.pos += 1; // consume '{'
        let mut table = Table::new();
        self.skip_trivia()?;
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(Value::Table(table));
        }
        loop {
            self.skip_trivia()?;
            let key = match self.peek() {
                Some(b'"') => self.parse_string()?,
                None => return Err(ParseError::UnexpectedEof { offset: self.pos }),
                Some(_) => {
                    return Err(ParseError::syntax(self.pos, "expected a quoted key"));
                }
            };
            self.skip_trivia()?;
            match self.peek() {
                Some(b':') => self.pos += 1,
                None => return Err(ParseError::UnexpectedEof { offset: self.pos }),
                Some(_) => return Err(ParseError::syntax(self.pos, "expected ':' after key")),
            }
            self.skip_trivia()?;
            let value = self.parse_value()?;
            table.insert(key, value);
            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_trivia()?;
                    if self.peek() == Some(b'}') {
                        self.pos += 1;
                        return Ok(Value::Table(table));
                    }
                }
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Value::Table(table));
                }
                None => return Err(ParseError::UnexpectedEof { offset: self.pos }),
                Some(_) => {
                    return Err(ParseError::syntax(self.pos, "expected ',' or '}'"));
                }
            }
        }
    }
}

/// Convert a scanned numeric run: float when it carries `.`/`e`/`E`,
/// 64-bit integer otherwise.
pub(crate) fn convert_number(token: &str, offset: usize) -> Result<Value, ParseError> {
    let is_float = token.contains(['.', 'e', 'E']);
    let invalid = || ParseError::InvalidNumber {
        offset,
        text: token.to_string(),
    };
    if is_float {
        token.parse::<f64>().map(Value::Float).map_err(|_| invalid())
    } else {
        token
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| invalid())
    }
}
