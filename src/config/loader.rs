//! Raw Configuration Loader
//!
//! Builds a [`RawConfig`] from a configuration file and environment variables
//! using the `config` crate, for hosts and tools that do not already hand the
//! engine a flat property map.
//!
//! Nested tables flatten into dot-delimited option names, so both of these
//! TOML snippets yield `redis.wait.replicas = "2"`:
//!
//! ```toml
//! [redis.wait]
//! replicas = 2
//! ```
//!
//! ```toml
//! [redis]
//! "wait.replicas" = 2
//! ```
//!
//! Arrays are joined with commas, which makes `redis.keys.patterns` easy to
//! write as a list. Environment variables such as
//! `REDIS_CONNECT_REDIS_WAIT_REPLICAS` override file values, and explicit
//! overrides win over both.

use super::error::{ConfigResult, ConfigurationError};
use super::RawConfig;
use crate::constants::WORK_UNIT_SEPARATOR;
use ::config::{Config, Environment, File, Source, Value, ValueKind};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Default prefix for environment variable overrides
pub const ENV_PREFIX: &str = "REDIS_CONNECT";

/// Layered loader: file, then environment, then explicit overrides
#[derive(Debug, Clone, Default)]
pub struct RawConfigLoader {
    file: Option<PathBuf>,
    env_prefix: Option<String>,
    overrides: RawConfig,
}

impl RawConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read options from a file; the format follows the file extension
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Read options from environment variables starting with `prefix_`
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    pub fn load(&self) -> ConfigResult<RawConfig> {
        let source_name = self.source_name();
        let mut builder = Config::builder();

        if let Some(path) = &self.file {
            if !path.is_file() {
                return Err(ConfigurationError::load(
                    path.display().to_string(),
                    "file not found",
                ));
            }
            builder = builder.add_source(File::from(path.as_path()));
        }

        let table: HashMap<String, Value> = builder
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|e| ConfigurationError::load(&source_name, e))?;

        let mut raw = RawConfig::new();
        for (key, value) in table {
            flatten_into(&mut raw, key, value).map_err(|e| ConfigurationError::load(&source_name, e))?;
        }

        // Environment keys stay flat: nesting them would make a value such as
        // redis.json.path collide with the redis.json.path.fixed table.
        if let Some(prefix) = &self.env_prefix {
            let variables = Environment::with_prefix(prefix)
                .separator("_")
                .collect()
                .map_err(|e| ConfigurationError::load(&source_name, e))?;
            for (key, value) in variables {
                let value = value
                    .into_string()
                    .map_err(|e| ConfigurationError::load(&source_name, e))?;
                raw.insert(key, value);
            }
        }

        raw.extend(self.overrides.clone());

        debug!(
            source = %source_name,
            option_count = raw.len(),
            "Loaded raw connector configuration"
        );
        Ok(raw)
    }

    fn source_name(&self) -> String {
        let mut parts = Vec::new();
        if let Some(path) = &self.file {
            parts.push(path.display().to_string());
        }
        if let Some(prefix) = &self.env_prefix {
            parts.push(format!("env:{prefix}_*"));
        }
        if parts.is_empty() {
            "overrides".to_string()
        } else {
            parts.join(" + ")
        }
    }
}

fn flatten_into(raw: &mut RawConfig, key: String, value: Value) -> Result<(), ::config::ConfigError> {
    match value.kind {
        ValueKind::Nil => {}
        ValueKind::Table(table) => {
            for (child, child_value) in table {
                flatten_into(raw, format!("{key}.{child}"), child_value)?;
            }
        }
        ValueKind::Array(items) => {
            let joined = items
                .into_iter()
                .map(Value::into_string)
                .collect::<Result<Vec<_>, _>>()?
                .join(WORK_UNIT_SEPARATOR);
            raw.insert(key, joined);
        }
        _ => {
            raw.insert(key, value.into_string()?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_toml_tables_flatten_to_option_names() {
        let file = write_file(
            ".toml",
            r#"
topic = "events"

[redis]
command = "JSONMERGE"
multiexec = false
"json.path" = "$.payload"

[redis.wait]
replicas = 2
timeout = 500

[redis.keys]
patterns = ["user:*", "order:*"]
"#,
        );

        let raw = RawConfigLoader::new().with_file(file.path()).load().unwrap();

        assert_eq!(raw.get("topic").map(String::as_str), Some("events"));
        assert_eq!(raw.get("redis.command").map(String::as_str), Some("JSONMERGE"));
        assert_eq!(raw.get("redis.multiexec").map(String::as_str), Some("false"));
        assert_eq!(raw.get("redis.json.path").map(String::as_str), Some("$.payload"));
        assert_eq!(raw.get("redis.wait.replicas").map(String::as_str), Some("2"));
        assert_eq!(raw.get("redis.wait.timeout").map(String::as_str), Some("500"));
        assert_eq!(
            raw.get("redis.keys.patterns").map(String::as_str),
            Some("user:*,order:*")
        );
    }

    #[test]
    fn test_overrides_win() {
        let file = write_file(".toml", "[redis]\nseparator = \"#\"\n");

        let raw = RawConfigLoader::new()
            .with_file(file.path())
            .with_override("redis.separator", "|")
            .load()
            .unwrap();

        assert_eq!(raw.get("redis.separator").map(String::as_str), Some("|"));
    }

    #[test]
    fn test_environment_source() {
        std::env::set_var("RCC_LOADER_TEST_REDIS_POOL", "12");

        let raw = RawConfigLoader::new()
            .with_env_prefix("RCC_LOADER_TEST")
            .load()
            .unwrap();

        std::env::remove_var("RCC_LOADER_TEST_REDIS_POOL");
        assert_eq!(raw.get("redis.pool").map(String::as_str), Some("12"));
    }

    #[test]
    fn test_environment_keeps_overlapping_option_names() {
        std::env::set_var("RCC_LOADER_PATHS_REDIS_JSON_PATH", "$.a");
        std::env::set_var("RCC_LOADER_PATHS_REDIS_JSON_PATH_FIXED", "$.b");

        let raw = RawConfigLoader::new()
            .with_env_prefix("RCC_LOADER_PATHS")
            .load();

        std::env::remove_var("RCC_LOADER_PATHS_REDIS_JSON_PATH");
        std::env::remove_var("RCC_LOADER_PATHS_REDIS_JSON_PATH_FIXED");

        let raw = raw.unwrap();
        assert_eq!(raw.get("redis.json.path").map(String::as_str), Some("$.a"));
        assert_eq!(raw.get("redis.json.path.fixed").map(String::as_str), Some("$.b"));
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = write_file(".toml", "[redis]\ncommand = \"SET\"\n");
        std::env::set_var("RCC_LOADER_LAYERS_REDIS_COMMAND", "HSET");

        let raw = RawConfigLoader::new()
            .with_file(file.path())
            .with_env_prefix("RCC_LOADER_LAYERS")
            .load();

        std::env::remove_var("RCC_LOADER_LAYERS_REDIS_COMMAND");
        assert_eq!(raw.unwrap().get("redis.command").map(String::as_str), Some("HSET"));
    }

    #[test]
    fn test_missing_file_is_a_load_error() {
        let error = RawConfigLoader::new()
            .with_file("/definitely/not/here/connector.toml")
            .load()
            .unwrap_err();

        assert!(matches!(error, ConfigurationError::Load { .. }));
        assert!(error.to_string().contains("connector.toml"));
    }

    #[test]
    fn test_no_sources_yields_overrides_only() {
        let raw = RawConfigLoader::new()
            .with_override("redis.uri", "redis://cache:6379")
            .load()
            .unwrap();

        assert_eq!(raw.len(), 1);
    }
}
