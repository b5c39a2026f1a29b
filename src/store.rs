//! The [`Config`] store: file/string loading, discovery, typed access, and
//! merging.
//!
//! # Discovery
//!
//! [`Config::discover`] probes a fixed sequence of directories — the current
//! directory, `./.config`, and `$HOME/.config/{app_name}` — and within each,
//! the file names `{app_name}.toml`, `{app_name}.json5`, `{app_name}.jsonc`,
//! `{app_name}.json`, in that order. The first file that exists is loaded
//! and wins. A missing candidate moves the search along; any other failure
//! (unreadable file, parse error, oversized file, non-table root) aborts the
//! whole discovery. When nothing matches anywhere, discovery succeeds with
//! an empty store — "no config" is a normal, default-using code path, not an
//! error.
//!
//! # Typed access
//!
//! The `get_*` accessors are exact-variant: `get_int` on a float returns
//! `None`, as does any accessor on a missing key. Callers that need to tell
//! the two cases apart can use [`Config::get`] and inspect the [`Value`].

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::{FigtreeError, ParseError};
use crate::format::ConfigFormat;
use crate::value::{Table, Value};
use crate::{json5, jsonc, toml};

/// Hard cap on config file size. Larger files fail, they are never truncated.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// File extensions probed by discovery, highest priority first.
const DISCOVERY_EXTENSIONS: [&str; 4] = ["toml", "json5", "jsonc", "json"];

/// A loaded configuration: a flat top-level mapping of keys to [`Value`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    data: Table,
}

impl Config {
    /// An empty store.
    pub fn new() -> Self {
        Self { data: Table::new() }
    }

    /// Load a config file. `format` may be a concrete format or
    /// [`ConfigFormat::Auto`] to resolve it from the file extension.
    pub fn from_file(
        path: impl AsRef<Path>,
        format: ConfigFormat,
    ) -> Result<Self, FigtreeError> {
        let path = path.as_ref();
        let format = format
            .detect(path)
            .ok_or_else(|| FigtreeError::UnrecognizedExtension {
                path: path.to_path_buf(),
            })?;

        let metadata = fs::metadata(path).map_err(|source| FigtreeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(FigtreeError::FileTooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
            });
        }

        let bytes = fs::read(path).map_err(|source| FigtreeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let content = String::from_utf8(bytes).map_err(|err| FigtreeError::ParseFile {
            path: path.to_path_buf(),
            source: ParseError::InvalidUnicode {
                offset: err.utf8_error().valid_up_to(),
            },
        })?;

        let config = Self::from_string(&content, format).map_err(|err| match err {
            // Attach the file path to errors coming from the string layer.
            FigtreeError::Parse(source) => FigtreeError::ParseFile {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        debug!(path = %path.display(), %format, keys = config.len(), "loaded config file");
        Ok(config)
    }

    /// Parse `content` as `format`. The format must be concrete; there is no
    /// extension to resolve [`Auto`](ConfigFormat::Auto) against.
    ///
    /// For JSONC and JSON5 the document root must be an object; its entries
    /// become the store's top-level mapping (the root wrapper itself is not
    /// kept). A TOML document is table-shaped by construction.
    pub fn from_string(content: &str, format: ConfigFormat) -> Result<Self, FigtreeError> {
        let data = match format {
            ConfigFormat::Auto => return Err(FigtreeError::FormatRequired),
            ConfigFormat::Toml => toml::parse(content)?,
            ConfigFormat::Jsonc | ConfigFormat::Json5 => {
                let root = match format {
                    ConfigFormat::Jsonc => jsonc::parse(content)?,
                    _ => json5::parse(content)?,
                };
                match root {
                    Value::Table(table) => table,
                    other => {
                        return Err(FigtreeError::RootNotTable {
                            format,
                            found: other.type_name(),
                        });
                    }
                }
            }
        };
        Ok(Self { data })
    }

    /// Search the standard locations for `{app_name}.{toml,json5,jsonc,json}`
    /// and load the first file that exists. See the module docs for the
    /// search order and failure policy.
    pub fn discover(app_name: &str) -> Result<Self, FigtreeError> {
        Self::discover_in(&discovery_dirs(app_name), app_name)
    }

    /// Like [`discover`](Self::discover) but over an explicit directory
    /// list. Lets tests control the search without touching CWD or `$HOME`.
    fn discover_in(dirs: &[PathBuf], app_name: &str) -> Result<Self, FigtreeError> {
        for dir in dirs {
            for ext in DISCOVERY_EXTENSIONS {
                let candidate = dir.join(format!("{app_name}.{ext}"));
                trace!(path = %candidate.display(), "probing config candidate");
                match Self::from_file(&candidate, ConfigFormat::Auto) {
                    Ok(config) => return Ok(config),
                    Err(FigtreeError::Io { source, .. })
                        if source.kind() == ErrorKind::NotFound =>
                    {
                        continue;
                    }
                    Err(other) => return Err(other),
                }
            }
        }
        debug!(app = app_name, "no config file found, starting empty");
        Ok(Self::new())
    }

    /// Look up a top-level key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Navigate nested tables by dotted key path (e.g. `"database.url"`).
    pub fn get_path(&self, dotted_key: &str) -> Option<&Value> {
        let (path, leaf) = match dotted_key.rsplit_once('.') {
            Some((p, l)) => (Some(p), l),
            None => (None, dotted_key),
        };

        let table = match path {
            Some(path) => {
                let mut current = &self.data;
                for segment in path.split('.') {
                    current = current.get(segment)?.as_table()?;
                }
                current
            }
            None => &self.data,
        };

        table.get(leaf)
    }

    /// The stored string for `key`, or `None` if the key is missing or holds
    /// any other variant. The same exact-variant rule applies to all `get_*`
    /// accessors.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key)?.as_str()
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.data.get(key)?.as_integer()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.data.get(key)?.as_bool()
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        self.data.get(key)?.as_float()
    }

    /// Move every top-level entry of `other` into this store, overwriting
    /// entries with the same key. `other` is consumed, so no value ends up
    /// shared between two stores.
    pub fn merge(&mut self, other: Config) {
        for (key, value) in other.data {
            self.data.insert(key, value);
        }
    }

    /// Top-level keys, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// The fixed search directories for `discover`, in priority order.
fn discovery_dirs(app_name: &str) -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from("."), PathBuf::from("./.config")];
    if let Some(user) = directories::UserDirs::new() {
        dirs.push(user.home_dir().join(".config").join(app_name));
    }
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn toml_string_end_to_end() {
        let config = Config::from_string(
            "name = \"my-app\"\nport = 8080\n[database]\nhost = \"localhost\"\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(config.get_str("name"), Some("my-app"));
        assert_eq!(config.get_int("port"), Some(8080));
        let db = config.get("database").unwrap().as_table().unwrap();
        assert_eq!(db["host"].as_str(), Some("localhost"));
    }

    #[test]
    fn jsonc_root_entries_become_top_level_keys() {
        let config = Config::from_string(
            "{ \"a\": 1, /* c */ \"b\": [1,2,3,], }",
            ConfigFormat::Jsonc,
        )
        .unwrap();
        assert_eq!(config.get_int("a"), Some(1));
        assert_eq!(config.get("b").unwrap().as_array().unwrap().len(), 3);
        assert_eq!(config.len(), 2);
    }

    #[test]
    fn json5_hex_and_infinity() {
        let config =
            Config::from_string("{ permissions: 0x755, maxValue: Infinity }", ConfigFormat::Json5)
                .unwrap();
        assert_eq!(config.get_int("permissions"), Some(1877));
        assert_eq!(config.get_float("maxValue"), Some(f64::INFINITY));
    }

    #[test]
    fn non_table_root_rejected_for_config() {
        let err = Config::from_string("[1, 2, 3]", ConfigFormat::Jsonc).unwrap_err();
        assert!(matches!(
            err,
            FigtreeError::RootNotTable { found: "array", .. }
        ));

        let err = Config::from_string("42", ConfigFormat::Json5).unwrap_err();
        assert!(matches!(
            err,
            FigtreeError::RootNotTable { found: "integer", .. }
        ));
    }

    #[test]
    fn auto_format_rejected_for_strings() {
        let err = Config::from_string("a = 1", ConfigFormat::Auto).unwrap_err();
        assert!(matches!(err, FigtreeError::FormatRequired));
    }

    #[test]
    fn typed_getters_are_exact_variant() {
        let config = Config::from_string(
            "s = \"text\"\ni = 3\nf = 3.5\nb = true\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        // Matching variant.
        assert_eq!(config.get_str("s"), Some("text"));
        assert_eq!(config.get_int("i"), Some(3));
        assert_eq!(config.get_float("f"), Some(3.5));
        assert_eq!(config.get_bool("b"), Some(true));
        // Wrong variant: no coercion, indistinguishable from missing.
        assert_eq!(config.get_float("i"), None);
        assert_eq!(config.get_int("f"), None);
        assert_eq!(config.get_str("b"), None);
        assert_eq!(config.get_int("missing"), None);
    }

    #[test]
    fn get_path_navigates_nested_tables() {
        let config = Config::from_string(
            "[database.pool]\nsize = 10\n[database]\nhost = \"db1\"\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(
            config.get_path("database.pool.size").unwrap().as_integer(),
            Some(10)
        );
        assert_eq!(
            config.get_path("database.host").unwrap().as_str(),
            Some("db1")
        );
        assert!(config.get_path("database.missing").is_none());
        assert!(config.get_path("database.host.deeper").is_none());
    }

    #[test]
    fn merge_overwrites_and_appends() {
        let mut base =
            Config::from_string("host = \"a\"\nport = 1\n", ConfigFormat::Toml).unwrap();
        let overlay =
            Config::from_string("port = 2\nextra = true\n", ConfigFormat::Toml).unwrap();
        base.merge(overlay);
        assert_eq!(base.get_str("host"), Some("a"));
        assert_eq!(base.get_int("port"), Some(2));
        assert_eq!(base.get_bool("extra"), Some(true));
        assert_eq!(base.len(), 3);
    }

    #[test]
    fn merge_replaces_whole_nested_values() {
        // Top-level overwrite: the overlay's table replaces the base table
        // wholesale, it is not deep-merged into it.
        let mut base = Config::from_string("[db]\nhost = \"a\"\nport = 1\n", ConfigFormat::Toml)
            .unwrap();
        let overlay = Config::from_string("[db]\nhost = \"b\"\n", ConfigFormat::Toml).unwrap();
        base.merge(overlay);
        let db = base.get("db").unwrap().as_table().unwrap();
        assert_eq!(db["host"].as_str(), Some("b"));
        assert!(db.get("port").is_none());
    }

    #[test]
    fn empty_store() {
        let config = Config::new();
        assert!(config.is_empty());
        assert_eq!(config.len(), 0);
        assert_eq!(config.get("anything"), None);
    }

    // --- file loading ---

    #[test]
    fn load_toml_file_with_auto_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.toml");
        fs::write(&path, "port = 3000\n").unwrap();
        let config = Config::from_file(&path, ConfigFormat::Auto).unwrap();
        assert_eq!(config.get_int("port"), Some(3000));
    }

    #[test]
    fn plain_json_file_tolerates_comments() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.json");
        fs::write(&path, "{ \"debug\": true, // enabled in dev\n }").unwrap();
        let config = Config::from_file(&path, ConfigFormat::Auto).unwrap();
        assert_eq!(config.get_bool("debug"), Some(true));
    }

    #[test]
    fn explicit_format_overrides_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.conf");
        fs::write(&path, "{ a: 1 }").unwrap();
        let config = Config::from_file(&path, ConfigFormat::Json5).unwrap();
        assert_eq!(config.get_int("a"), Some(1));
    }

    #[test]
    fn unknown_extension_with_auto_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.yaml");
        fs::write(&path, "a: 1\n").unwrap();
        let err = Config::from_file(&path, ConfigFormat::Auto).unwrap_err();
        assert!(matches!(err, FigtreeError::UnrecognizedExtension { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err =
            Config::from_file(dir.path().join("absent.toml"), ConfigFormat::Auto).unwrap_err();
        match err {
            FigtreeError::Io { source, .. } => {
                assert_eq!(source.kind(), ErrorKind::NotFound);
            }
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn parse_failure_reports_the_file_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "name \"x\"\n").unwrap();
        let err = Config::from_file(&path, ConfigFormat::Auto).unwrap_err();
        match err {
            FigtreeError::ParseFile { path: p, source } => {
                assert!(p.ends_with("bad.toml"));
                assert!(matches!(source, ParseError::InvalidSyntax { .. }));
            }
            other => panic!("expected ParseFile, got {other:?}"),
        }
    }

    #[test]
    fn oversized_file_fails_without_truncation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.toml");
        fs::write(&path, vec![b'#'; (MAX_FILE_SIZE + 1) as usize]).unwrap();
        let err = Config::from_file(&path, ConfigFormat::Auto).unwrap_err();
        assert!(matches!(
            err,
            FigtreeError::FileTooLarge { size, .. } if size == MAX_FILE_SIZE + 1
        ));
    }

    #[test]
    fn non_utf8_file_is_invalid_unicode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bin.toml");
        fs::write(&path, [b'a', b' ', b'=', b' ', 0xFF, 0xFE]).unwrap();
        let err = Config::from_file(&path, ConfigFormat::Auto).unwrap_err();
        match err {
            FigtreeError::ParseFile { source, .. } => {
                assert!(matches!(source, ParseError::InvalidUnicode { offset: 4 }));
            }
            other => panic!("expected ParseFile, got {other:?}"),
        }
    }

    // --- discovery ---

    #[test]
    fn discover_returns_empty_store_when_nothing_matches() {
        let dir = TempDir::new().unwrap();
        let config =
            Config::discover_in(&[dir.path().to_path_buf()], "nonexistent-app").unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn discover_prefers_toml_within_a_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.toml"), "src = \"toml\"\n").unwrap();
        fs::write(dir.path().join("app.json5"), "{ src: 'json5' }").unwrap();
        let config = Config::discover_in(&[dir.path().to_path_buf()], "app").unwrap();
        assert_eq!(config.get_str("src"), Some("toml"));
    }

    #[test]
    fn discover_earlier_directory_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(first.path().join("app.jsonc"), "{ \"from\": \"first\" }").unwrap();
        fs::write(second.path().join("app.toml"), "from = \"second\"\n").unwrap();
        let config = Config::discover_in(
            &[first.path().to_path_buf(), second.path().to_path_buf()],
            "app",
        )
        .unwrap();
        // The first directory is exhausted before the second is probed, even
        // though the second holds a higher-priority extension.
        assert_eq!(config.get_str("from"), Some("first"));
    }

    #[test]
    fn discover_falls_through_missing_candidates() {
        let empty = TempDir::new().unwrap();
        let populated = TempDir::new().unwrap();
        fs::write(populated.path().join("app.json"), "{ \"found\": true }").unwrap();
        let config = Config::discover_in(
            &[empty.path().to_path_buf(), populated.path().to_path_buf()],
            "app",
        )
        .unwrap();
        assert_eq!(config.get_bool("found"), Some(true));
    }

    #[test]
    fn discover_aborts_on_malformed_candidate() {
        let broken = TempDir::new().unwrap();
        let healthy = TempDir::new().unwrap();
        fs::write(broken.path().join("app.toml"), "not toml at all\n").unwrap();
        fs::write(healthy.path().join("app.toml"), "ok = true\n").unwrap();
        // The malformed file exists, so it must fail loudly rather than fall
        // through to the healthy one.
        let err = Config::discover_in(
            &[broken.path().to_path_buf(), healthy.path().to_path_buf()],
            "app",
        )
        .unwrap_err();
        assert!(matches!(err, FigtreeError::ParseFile { .. }));
    }

    #[test]
    fn discover_with_no_search_dirs_is_empty() {
        let config = Config::discover_in(&[], "app").unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn equivalent_documents_produce_equal_stores() {
        let from_toml = Config::from_string(
            "name = \"app\"\nport = 8080\n[limits]\nburst = 10\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        let from_jsonc = Config::from_string(
            r#"{ "name": "app", "port": 8080, "limits": { "burst": 10 } }"#,
            ConfigFormat::Jsonc,
        )
        .unwrap();
        let from_json5 = Config::from_string(
            "{ name: 'app', port: 8080, limits: { burst: 10 } }",
            ConfigFormat::Json5,
        )
        .unwrap();
        assert_eq!(from_toml, from_jsonc);
        assert_eq!(from_jsonc, from_json5);
    }
}
