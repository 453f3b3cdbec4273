//! Connection options shared by the source and sink connectors.
//!
//! [`ConnectionConfig`] is embedded by value in both typed connector
//! configurations, and [`options`] is prepended to both option schemas.

use super::error::{ConfigResult, ConfigurationError};
use super::schema::{Importance, OptionKind, OptionSpec, OptionValidator, ParsedConfig};
use super::RawConfig;
use std::time::Duration;

pub const URI_CONFIG: &str = "redis.uri";
pub const URI_DEFAULT: &str = "redis://localhost:6379";
pub const URI_DOC: &str = "URI of the Redis database to connect to, e.g. redis://redis-12000.redis.com:12000. For Redis Cluster use redis.cluster.";

pub const CLUSTER_CONFIG: &str = "redis.cluster";
pub const CLUSTER_DEFAULT: &str = "false";
pub const CLUSTER_DOC: &str = "Connect to a Redis Cluster database.";

pub const TLS_CONFIG: &str = "redis.tls";
pub const TLS_DEFAULT: &str = "false";
pub const TLS_DOC: &str = "Establish a secure TLS connection.";

pub const INSECURE_CONFIG: &str = "redis.insecure";
pub const INSECURE_DEFAULT: &str = "false";
pub const INSECURE_DOC: &str = "Allow insecure connections (e.g. invalid certificates) to Redis when using SSL.";

pub const USERNAME_CONFIG: &str = "redis.username";
pub const USERNAME_DEFAULT: &str = "";
pub const USERNAME_DOC: &str = "Username to use to connect to Redis.";

pub const PASSWORD_CONFIG: &str = "redis.password";
pub const PASSWORD_DEFAULT: &str = "";
pub const PASSWORD_DOC: &str = "Password to use to connect to Redis.";

pub const TIMEOUT_CONFIG: &str = "redis.timeout";
pub const TIMEOUT_DEFAULT: &str = "60";
pub const TIMEOUT_DOC: &str = "Redis command timeout in seconds.";

pub const POOL_MAX_CONFIG: &str = "redis.pool";
pub const POOL_MAX_DEFAULT: &str = "8";
pub const POOL_MAX_DOC: &str = "Max pool connections.";

/// Options whose values never appear in diagnostic output
pub const SECRET_OPTIONS: &[&str] = &[PASSWORD_CONFIG];

/// Replacement shown for a non-empty secret value
pub const MASKED_VALUE: &str = "***";

pub fn is_secret(name: &str) -> bool {
    SECRET_OPTIONS.contains(&name)
}

/// Copy of `raw` with every non-empty secret value masked
pub fn masked(raw: &RawConfig) -> RawConfig {
    raw.iter()
        .map(|(key, value)| {
            let shown = if is_secret(key) && !value.is_empty() {
                MASKED_VALUE.to_string()
            } else {
                value.clone()
            };
            (key.clone(), shown)
        })
        .collect()
}

/// Connection option declarations
pub fn options() -> Vec<OptionSpec> {
    vec![
        OptionSpec::new(URI_CONFIG, OptionKind::String, URI_DEFAULT, Importance::High, URI_DOC)
            .with_validator(OptionValidator::NonBlank),
        OptionSpec::new(CLUSTER_CONFIG, OptionKind::Boolean, CLUSTER_DEFAULT, Importance::Medium, CLUSTER_DOC),
        OptionSpec::new(TLS_CONFIG, OptionKind::Boolean, TLS_DEFAULT, Importance::Medium, TLS_DOC),
        OptionSpec::new(INSECURE_CONFIG, OptionKind::Boolean, INSECURE_DEFAULT, Importance::Medium, INSECURE_DOC),
        OptionSpec::new(USERNAME_CONFIG, OptionKind::String, USERNAME_DEFAULT, Importance::Medium, USERNAME_DOC),
        OptionSpec::new(PASSWORD_CONFIG, OptionKind::String, PASSWORD_DEFAULT, Importance::Medium, PASSWORD_DOC),
        OptionSpec::new(TIMEOUT_CONFIG, OptionKind::Long, TIMEOUT_DEFAULT, Importance::Medium, TIMEOUT_DOC)
            .with_validator(OptionValidator::AtLeast(0)),
        OptionSpec::new(POOL_MAX_CONFIG, OptionKind::Int, POOL_MAX_DEFAULT, Importance::Medium, POOL_MAX_DOC)
            .with_validator(OptionValidator::AtLeast(1)),
    ]
}

/// Connection pool sizing handed to the data-plane client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
    pub max_total: u32,
}

#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    uri: String,
    cluster: bool,
    tls: bool,
    insecure: bool,
    username: String,
    password: String,
    timeout: Duration,
    pool_max: u32,
}

impl ConnectionConfig {
    pub(crate) fn from_parsed(parsed: &ParsedConfig) -> ConfigResult<Self> {
        Ok(Self {
            uri: parsed.get_string(URI_CONFIG)?.to_string(),
            cluster: parsed.get_bool(CLUSTER_CONFIG)?,
            tls: parsed.get_bool(TLS_CONFIG)?,
            insecure: parsed.get_bool(INSECURE_CONFIG)?,
            username: parsed.get_string(USERNAME_CONFIG)?.to_string(),
            password: parsed.get_string(PASSWORD_CONFIG)?.to_string(),
            timeout: Duration::from_secs(non_negative(parsed, TIMEOUT_CONFIG)?),
            pool_max: positive_u32(parsed, POOL_MAX_CONFIG)?,
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn is_cluster(&self) -> bool {
        self.cluster
    }

    pub fn is_tls(&self) -> bool {
        self.tls
    }

    pub fn is_insecure(&self) -> bool {
        self.insecure
    }

    /// Username, absent when left blank
    pub fn username(&self) -> Option<&str> {
        Some(self.username.as_str()).filter(|u| !u.is_empty())
    }

    /// Password, absent when left blank
    pub fn password(&self) -> Option<&str> {
        Some(self.password.as_str()).filter(|p| !p.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            max_total: self.pool_max,
        }
    }
}

// Keep the password out of logs and error output.
impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("uri", &self.uri)
            .field("cluster", &self.cluster)
            .field("tls", &self.tls)
            .field("insecure", &self.insecure)
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "" } else { MASKED_VALUE })
            .field("timeout", &self.timeout)
            .field("pool_max", &self.pool_max)
            .finish()
    }
}

/// Long option that must not be negative, as `u64`
pub(crate) fn non_negative(parsed: &ParsedConfig, name: &str) -> ConfigResult<u64> {
    let value = parsed.get_long(name)?;
    u64::try_from(value)
        .map_err(|_| ConfigurationError::parse(name, value.to_string(), "Value must be at least 0"))
}

fn positive_u32(parsed: &ParsedConfig, name: &str) -> ConfigResult<u32> {
    let value = parsed.get_int(name)?;
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| ConfigurationError::parse(name, value.to_string(), "Value must be at least 1"))
}
