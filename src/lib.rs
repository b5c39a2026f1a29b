//! Multi-format configuration loading for Rust CLI apps. Point figtree at a
//! file — or let it discover one — and read typed values.
//!
//! Figtree parses three config formats with its own recursive-descent
//! parsers and normalizes them all into a single value tree:
//!
//! - **TOML** — sections and `key = value` pairs, the classic app-config
//!   shape.
//! - **JSONC** — JSON plus `//` and `/* */` comments and trailing commas.
//!   Plain `.json` files are read with this parser too, so a stray comment
//!   in a `.json` config never breaks loading.
//! - **JSON5** — JSONC plus unquoted keys, single-quoted strings, hex
//!   integers, and `Infinity`/`NaN` literals.
//!
//! ```ignore
//! let config = figtree::Config::discover("myapp")?;
//!
//! let host = config.get_str("host").unwrap_or("localhost");
//! let port = config.get_int("port").unwrap_or(8080);
//! ```
//!
//! # One tree for every format
//!
//! Every parser produces the same [`Value`] type: null, boolean, 64-bit
//! integer, float, string, array, or table. A document's meaning does not
//! depend on which grammar carried it — the TOML, JSONC, and JSON5 spellings
//! of the same data load into structurally equal stores. Typed access goes
//! through exact-variant getters: [`Config::get_int`] on a float is `None`,
//! not a coercion.
//!
//! # Discovery
//!
//! [`Config::discover`] searches fixed locations in fixed order:
//!
//! 1. `./{app}.{toml,json5,jsonc,json}`
//! 2. `./.config/{app}.{...}`
//! 3. `$HOME/.config/{app}/{app}.{...}`
//!
//! The first file that exists wins. A candidate that exists but fails to
//! load (parse error, oversized, wrong root shape) aborts discovery with
//! that error — broken config should be fixed, not silently shadowed by a
//! lower-priority file. If nothing is found, discovery returns an empty
//! store and the application runs on its defaults.
//!
//! # Loading and merging
//!
//! [`Config::from_file`] loads one file, resolving
//! [`Auto`](ConfigFormat::Auto) format from the extension;
//! [`Config::from_string`] parses in-memory text with an explicit format.
//! Files are capped at 10 MiB — an oversized file is an error, never a
//! truncated read. [`Config::merge`] layers one store's top-level keys over
//! another's, later values winning wholesale (no deep merge).
//!
//! # Error handling
//!
//! Parsers report [`ParseError`] with the byte offset where they stopped and
//! the offending token or escape character. The loading layer wraps those in
//! [`FigtreeError`] together with the file path, so a host application can
//! print a usable diagnostic and exit non-zero. A failed parse never yields
//! a partial store.
//!
//! Figtree is a synchronous library with no I/O beyond reading the config
//! file; a [`Config`] is a plain owned value and callers that share one
//! across threads serialize access themselves.

pub mod error;
pub mod format;
pub mod value;

mod json5;
mod jsonc;
mod store;
mod toml;

pub use error::{FigtreeError, ParseError};
pub use format::ConfigFormat;
pub use store::{Config, MAX_FILE_SIZE};
pub use value::{Table, Value};
