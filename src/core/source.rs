use crate::domain::model::{ConfigFormat, ConfigSource, ConfigTarget};
use crate::utils::error::{ConfigSourceError, Result};
use regex::Regex;
use serde_json::{Map, Number, Value};
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

/// Load settings from `source` into `config`.
///
/// Only upper-case top-level keys are copied. Returns `Ok(false)` when the
/// source file is missing and `silent` is set; parse errors are never
/// silenced.
pub async fn load_to<C>(
    config: &mut C,
    source: ConfigSource,
    format: ConfigFormat,
    silent: bool,
) -> Result<bool>
where
    C: ConfigTarget + ?Sized,
{
    load_to_with(config, source, format, silent, false).await
}

/// Same as [`load_to`], optionally replacing `${VAR}` references with
/// environment values before parsing.
pub async fn load_to_with<C>(
    config: &mut C,
    source: ConfigSource,
    format: ConfigFormat,
    silent: bool,
    expand_env: bool,
) -> Result<bool>
where
    C: ConfigTarget + ?Sized,
{
    let data = match source {
        ConfigSource::Bytes(data) => data,
        ConfigSource::File(path) => match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) => {
                let err = ConfigSourceError::from(e);
                if silent && err.is_not_found() {
                    tracing::debug!("Config file {} not found, skipping", path.display());
                    return Ok(false);
                }
                return Err(err);
            }
        },
    };

    let content = String::from_utf8(data).map_err(|e| ConfigSourceError::ParseError {
        message: format!("config is not valid UTF-8: {}", e),
    })?;
    let content = if expand_env {
        substitute_env_vars(&content)
    } else {
        content
    };

    let settings = parse_settings(&content, format)?;
    let mut loaded = 0usize;
    for (key, value) in settings {
        if is_upper_key(&key) {
            config.set(key, value);
            loaded += 1;
        }
    }

    tracing::debug!("Loaded {} settings ({:?})", loaded, format);
    Ok(true)
}

pub fn parse_settings(content: &str, format: ConfigFormat) -> Result<Map<String, Value>> {
    let value: Value = match format {
        ConfigFormat::Toml => {
            let table: toml::Table = toml::from_str(content)?;
            return Ok(table_to_map(table));
        }
        ConfigFormat::Json => serde_json::from_str(content)?,
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(ConfigSourceError::ParseError {
            message: format!("expected a table of settings, found {}", type_name(&other)),
        }),
    }
}

fn table_to_map(table: toml::Table) -> Map<String, Value> {
    table
        .into_iter()
        .map(|(key, value)| (key, toml_to_json(value)))
        .collect()
}

/// Datetimes become their RFC 3339 string; non-finite floats become null.
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(table_to_map(table)),
    }
}

/// Replace `${VAR}` with the environment value; unknown names stay as-is.
pub fn substitute_env_vars(content: &str) -> String {
    ENV_VAR_PATTERN
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
}

/// A key is upper case when it has a cased character and none are lower case.
pub fn is_upper_key(key: &str) -> bool {
    let mut has_cased = false;
    for c in key.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a table",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_is_upper_key() {
        assert!(is_upper_key("A"));
        assert!(is_upper_key("DATABASE_URL"));
        assert!(is_upper_key("S3_BUCKET_2"));
        assert!(!is_upper_key("debug"));
        assert!(!is_upper_key("Mixed"));
        assert!(!is_upper_key("_42"));
        assert!(!is_upper_key(""));
    }

    #[test]
    fn test_parse_settings_toml() {
        let map = parse_settings("A=1\nNAME = \"svc\"\n[DB]\nPORT = 5432\n", ConfigFormat::Toml)
            .unwrap();
        assert_eq!(map["A"], json!(1));
        assert_eq!(map["NAME"], json!("svc"));
        assert_eq!(map["DB"], json!({"PORT": 5432}));
    }

    #[test]
    fn test_parse_settings_toml_datetime() {
        let map = parse_settings(
            "CREATED = 1979-05-27T07:32:00Z\n[DB]\nBACKUP_AT = 07:32:00\nRATIO = 0.5\nHOSTS = [\"a\", \"b\"]\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(map["CREATED"], json!("1979-05-27T07:32:00Z"));
        assert_eq!(
            map["DB"],
            json!({"BACKUP_AT": "07:32:00", "RATIO": 0.5, "HOSTS": ["a", "b"]})
        );
    }

    #[tokio::test]
    async fn test_load_to_datetime_value() {
        let mut config: HashMap<String, Value> = HashMap::new();
        let source = ConfigSource::Bytes(b"CREATED = 1979-05-27T07:32:00Z".to_vec());

        load_to(&mut config, source, ConfigFormat::Toml, false).await.unwrap();

        assert_eq!(config["CREATED"], json!("1979-05-27T07:32:00Z"));
    }

    #[test]
    fn test_parse_settings_rejects_non_table() {
        let err = parse_settings("[1, 2]", ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, ConfigSourceError::ParseError { .. }));
    }

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("CONFIG_SOURCE_S3_TEST_HOST", "db.internal");
        let out = substitute_env_vars("HOST = \"${CONFIG_SOURCE_S3_TEST_HOST}\"\nX = \"${CONFIG_SOURCE_S3_UNSET}\"");
        assert_eq!(out, "HOST = \"db.internal\"\nX = \"${CONFIG_SOURCE_S3_UNSET}\"");
    }

    #[tokio::test]
    async fn test_load_to_bytes_keeps_upper_keys() {
        let mut config: HashMap<String, Value> = HashMap::new();
        let source = ConfigSource::Bytes(b"A = 1\nlower = 2\nB = true\n".to_vec());

        let loaded = load_to(&mut config, source, ConfigFormat::Toml, false).await.unwrap();

        assert!(loaded);
        assert_eq!(config.len(), 2);
        assert_eq!(config["A"], json!(1));
        assert_eq!(config["B"], json!(true));
    }

    #[tokio::test]
    async fn test_load_to_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let mut config: HashMap<String, Value> = HashMap::new();

        let loaded = load_to(&mut config, ConfigSource::File(missing.clone()), ConfigFormat::Toml, true)
            .await
            .unwrap();
        assert!(!loaded);
        assert!(config.is_empty());

        let err = load_to(&mut config, ConfigSource::File(missing), ConfigFormat::Toml, false)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_load_to_directory_source() {
        let dir = tempfile::tempdir().unwrap();
        let mut config: HashMap<String, Value> = HashMap::new();

        let loaded = load_to(
            &mut config,
            ConfigSource::File(dir.path().to_path_buf()),
            ConfigFormat::Toml,
            true,
        )
        .await
        .unwrap();
        assert!(!loaded);
        assert!(config.is_empty());

        let err = load_to(
            &mut config,
            ConfigSource::File(dir.path().to_path_buf()),
            ConfigFormat::Toml,
            false,
        )
        .await
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_load_to_parse_error_not_silenced() {
        let mut config: HashMap<String, Value> = HashMap::new();
        let source = ConfigSource::Bytes(b"A = = 1".to_vec());

        let err = load_to(&mut config, source, ConfigFormat::Toml, true).await.unwrap_err();
        assert!(matches!(err, ConfigSourceError::TomlError(_)));
    }
}
