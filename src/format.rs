//! Config file format selection and extension-based detection.
//!
//! The mapping from file extension to format is fixed policy:
//! `.toml` → TOML, `.jsonc` → JSONC, `.json5` → JSON5, and `.json` → JSONC.
//! Plain `.json` files deliberately get the lenient parser, so comments and
//! trailing commas are tolerated there too.

use std::fmt;
use std::path::Path;

/// Which parser to use for a config source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Jsonc,
    Json5,
    /// Resolve the format from the file extension at load time.
    Auto,
}

impl ConfigFormat {
    /// Map a file extension (without the dot) to a concrete format.
    pub fn from_extension(ext: &str) -> Option<ConfigFormat> {
        match ext {
            "toml" => Some(ConfigFormat::Toml),
            "jsonc" => Some(ConfigFormat::Jsonc),
            "json5" => Some(ConfigFormat::Json5),
            // Lenient by design: .json goes through the JSONC parser.
            "json" => Some(ConfigFormat::Jsonc),
            _ => None,
        }
    }

    /// Resolve `Auto` against a path's extension. Concrete formats pass
    /// through unchanged.
    pub fn detect(self, path: &Path) -> Option<ConfigFormat> {
        match self {
            ConfigFormat::Auto => path
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(ConfigFormat::from_extension),
            concrete => Some(concrete),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigFormat::Toml => "toml",
            ConfigFormat::Jsonc => "jsonc",
            ConfigFormat::Json5 => "json5",
            ConfigFormat::Auto => "auto",
        };
        write!(f, "{name}")
    }
}
