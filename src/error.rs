use std::path::PathBuf;
use thiserror::Error;

use crate::format::ConfigFormat;

/// Error produced by one of the format parsers.
///
/// Every variant carries the byte offset at which the parser stopped, so a
/// host application can point at the offending position. A parser that fails
/// discards everything it built; no partial tree is ever returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unexpected end of input at byte {offset}")]
    UnexpectedEof { offset: usize },

    #[error("invalid syntax at byte {offset}: {message}")]
    InvalidSyntax { offset: usize, message: String },

    #[error("invalid escape sequence '\\{found}' at byte {offset}")]
    InvalidEscape { offset: usize, found: char },

    #[error("invalid number '{text}' at byte {offset}")]
    InvalidNumber { offset: usize, text: String },

    #[error("invalid value '{text}' at byte {offset}")]
    InvalidValue { offset: usize, text: String },

    #[error("input is not valid UTF-8 (first bad byte at offset {offset})")]
    InvalidUnicode { offset: usize },
}

impl ParseError {
    /// Shorthand for the most common variant.
    pub(crate) fn syntax(offset: usize, message: impl Into<String>) -> Self {
        ParseError::InvalidSyntax {
            offset,
            message: message.into(),
        }
    }
}

/// Error produced by the [`Config`](crate::Config) loading layer.
#[derive(Debug, Error)]
pub enum FigtreeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is {size} bytes, larger than the 10 MiB limit")]
    FileTooLarge { path: PathBuf, size: u64 },

    #[error("failed to parse {path}: {source}")]
    ParseFile { path: PathBuf, source: ParseError },

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The document parsed, but its root is not an object/table and so
    /// cannot populate a key-value store.
    #[error("root of a {format} config must be a table, not a {found}")]
    RootNotTable {
        format: ConfigFormat,
        found: &'static str,
    },

    #[error("cannot detect config format of {path}: unrecognized extension")]
    UnrecognizedExtension { path: PathBuf },

    #[error("a concrete format is required when loading from a string")]
    FormatRequired,
}
