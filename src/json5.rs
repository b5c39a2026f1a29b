//! Recursive-descent parser for JSON5.
//!
//! Everything the JSONC parser accepts, plus the JSON5 extensions that
//! matter for config files:
//!
//! - unquoted object keys (runs of alphanumerics, `_`, or `$`)
//! - single-quoted strings, and the extra escapes `\v` and `\0`
//! - hexadecimal integer literals (`0x755`)
//! - a leading unary `+` on numbers
//! - the special float literals `Infinity`, `-Infinity`, and `NaN`
//!
//! Number handling keeps the scan-loosely-validate-on-conversion shape of
//! the JSONC parser; hex and the special floats are dispatched on their
//! leading character before the generic scan runs.

use crate::error::ParseError;
use crate::jsonc::convert_number;
use crate::value::{Table, Value};

/// Parse a complete JSON5 document. The root may be any value type.
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
            Some(quote @ (b'"' | b'\'')) => Ok(Value::String(self.parse_string(quote)?)),
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

    /// Single- or double-quoted string. The escape set is JSONC's plus
    /// `\v` and `\0`.
    fn parse_string(&mut self, quote: u8) -> Result<String, ParseError> {
        self.pos += 1; // opening quote
        let mut out = String::new();
        let mut run_start = self.pos;
        loop {
            match self.peek() {
                None => return Err(ParseError::UnexpectedEof { offset: self.pos }),
                Some(b) if b == quote => {
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
                        b'v' => '\u{000B}',
                        b'0' => '\0',
                        _ => {
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

    /// Numbers, including the JSON5-only forms. The leading character (after
    /// an optional sign) decides the route: `I`/`N` for the special floats,
    /// `0x` for hex, anything else falls through to the permissive scan.
    fn parse_number(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;
        let mut negative = false;
        match self.peek() {
            Some(b'+') => self.pos += 1,
            Some(b'-') => {
                negative = true;
                self.pos += 1;
            }
            _ => {}
        }

        match self.peek() {
            Some(b'I') => return self.parse_word_float(start, "Infinity", negative),
            Some(b'N') => return self.parse_word_float(start, "NaN", false),
            Some(b'0')
                if matches!(self.bytes.get(self.pos + 1), Some(b'x' | b'X')) =>
            {
                return self.parse_hex(start, negative);
            }
            _ => {}
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

    /// `Infinity` / `NaN`, with the sign already consumed.
    fn parse_word_float(
        &mut self,
        start: usize,
        word: &str,
        negative: bool,
    ) -> Result<Value, ParseError> {
        if self.input[self.pos..].starts_with(word) {
            self.pos += word.len();
            let value = match word {
                "Infinity" if negative => f64::NEG_INFINITY,
                "Infinity" => f64::INFINITY,
                _ => f64::NAN,
            };
            Ok(Value::Float(value))
        } else {
            // Take the identifier run so the error shows what was written.
            let end = self.input[self.pos..]
                .find(|c: char| !c.is_ascii_alphanumeric())
                .map_or(self.input.len(), |i| self.pos + i);
            Err(ParseError::InvalidNumber {
                offset: start,
                text: self.input[start..end].to_string(),
            })
        }
    }

    /// `0x` / `0X` hexadecimal 64-bit integer. No hexadecimal floats.
    fn parse_hex(&mut self, start: usize, negative: bool) -> Result<Value, ParseError> {
        self.pos += 2; // consume "0x"
        let digits_start = self.pos;
        while let Some(b'0'..=b'9' | b'a'..=b'f' | b'A'..=b'F') = self.peek() {
            self.pos += 1;
        }
        let digits = &self.input[digits_start..self.pos];
        let invalid = || ParseError::InvalidNumber {
            offset: start,
            text: self.input[start..self.pos].to_string(),
        };
        if digits.is_empty() {
            return Err(invalid());
        }
        let magnitude = i64::from_str_radix(digits, 16).map_err(|_| invalid())?;
        Ok(Value::Integer(if negative { -magnitude } else { magnitude }))
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
            let key = self.parse_key()?;
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

    /// Quoted key (either quote style) or a bare identifier key: a non-empty
    /// run of alphanumerics, `_`, or `$`.
    fn parse_key(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some(quote @ (b'"' | b'\'')) => self.parse_string(quote),
            None => Err(ParseError::UnexpectedEof { offset: self.pos }),
            Some(_) => {
                let start = self.pos;
                while let Some(b) = self.peek() {
                    if b.is_ascii_alphanumeric() || b == b'_' || b == b'$' {
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
                if self.pos == start {
                    return Err(ParseError::syntax(start, "expected a key"));
                }
                Ok(self.input[start..self.pos].to_string())
            }
        }
    }
}
