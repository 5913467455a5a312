use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Bucket and key of an `s3://` location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Path {
    pub bucket: String,
    pub key: String,
}

/// Connection settings used when building a bucket handle.
///
/// Explicit keys take precedence over `profile`; with neither set the
/// default credential chain is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub profile: Option<String>,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ConfigFormat {
    #[default]
    Toml,
    Json,
}

impl ConfigFormat {
    /// `.json` files are JSON, everything else is read as TOML.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub credentials: Credentials,
    pub cache_filename: Option<PathBuf>,
    pub update_cache: bool,
    pub silent: bool,
    pub format: Option<ConfigFormat>,
    pub expand_env: bool,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_cache(mut self, cache_filename: impl Into<PathBuf>) -> Self {
        self.cache_filename = Some(cache_filename.into());
        self
    }

    pub fn update_cache(mut self, update_cache: bool) -> Self {
        self.update_cache = update_cache;
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn with_format(mut self, format: ConfigFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn expand_env(mut self, expand_env: bool) -> Self {
        self.expand_env = expand_env;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Bytes(Vec<u8>),
}

/// Receiver of loaded settings.
pub trait ConfigTarget {
    fn set(&mut self, key: String, value: Value);
}

impl ConfigTarget for HashMap<String, Value> {
    fn set(&mut self, key: String, value: Value) {
        self.insert(key, value);
    }
}

impl ConfigTarget for BTreeMap<String, Value> {
    fn set(&mut self, key: String, value: Value) {
        self.insert(key, value);
    }
}

impl ConfigTarget for Map<String, Value> {
    fn set(&mut self, key: String, value: Value) {
        self.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path("app.json"), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path("dir/APP.JSON"), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path("app.toml"), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path("mycfg.py"), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path("settings"), ConfigFormat::Toml);
    }

    #[test]
    fn test_load_options_builder() {
        let options = LoadOptions::new()
            .with_cache("/tmp/out.toml")
            .update_cache(true)
            .silent(true);

        assert_eq!(options.cache_filename, Some(PathBuf::from("/tmp/out.toml")));
        assert!(options.update_cache);
        assert!(options.silent);
        assert!(options.format.is_none());
        assert_eq!(options.credentials, Credentials::default());
    }
}
