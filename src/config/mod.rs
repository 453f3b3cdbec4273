//! # Connector Configuration System
//!
//! Turns the flat, string-keyed property map a host hands to a connector into
//! a strongly-typed, internally consistent configuration.
//!
//! ## Architecture
//!
//! - **Option Schema** ([`schema`]): declared options with type, default,
//!   importance, documentation and an optional validator
//! - **Config Validator** ([`validator`]): per-field checks for every option,
//!   then cross-field rules, collecting every error
//! - **Typed Config** ([`sink`], [`source`], [`connection`]): immutable typed
//!   views built from a raw map, failing loudly on anything that cannot be
//!   coerced
//! - **Loader** ([`loader`]): optional file/environment source for raw maps
//!
//! ## Usage
//!
//! ```rust
//! use redis_connect_core::config::{sink, RawConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut raw = RawConfig::new();
//! raw.insert("redis.command".to_string(), "LPUSH".to_string());
//! raw.insert("redis.multiexec".to_string(), "true".to_string());
//!
//! let result = sink::validator()?.validate_all(&raw);
//! result.ensure_valid()?;
//!
//! let config = sink::SinkConfig::from_raw(&raw)?;
//! assert!(config.is_multiexec());
//! # Ok(())
//! # }
//! ```

pub mod charset;
pub mod connection;
pub mod error;
pub mod loader;
pub mod schema;
pub mod sink;
pub mod source;
pub mod validator;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub use charset::Charset;
pub use connection::ConnectionConfig;
pub use error::{ConfigResult, ConfigurationError};
pub use loader::RawConfigLoader;
pub use schema::{OptionSchema, OptionSpec};
pub use sink::SinkConfig;
pub use source::SourceConfig;
pub use validator::{ConfigValidator, ValidationResult};

/// Flat option-name to string-value map supplied by the host
pub type RawConfig = HashMap<String, String>;

/// Which connector a configuration belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectorKind {
    Source,
    Sink,
}

impl ConnectorKind {
    /// Option schema for this kind of connector
    pub fn schema(&self) -> ConfigResult<OptionSchema> {
        match self {
            Self::Source => source::schema(),
            Self::Sink => sink::schema(),
        }
    }

    /// Validator (schema plus cross-field rules) for this kind of connector
    pub fn validator(&self) -> ConfigResult<ConfigValidator> {
        match self {
            Self::Source => source::validator(),
            Self::Sink => sink::validator(),
        }
    }
}

impl fmt::Display for ConnectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Sink => write!(f, "sink"),
        }
    }
}

impl FromStr for ConnectorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "source" => Ok(Self::Source),
            "sink" => Ok(Self::Sink),
            _ => Err(format!("Invalid connector kind: {s}")),
        }
    }
}

/// Typed configuration of either connector, tagged by kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectorConfig {
    Source(SourceConfig),
    Sink(SinkConfig),
}

impl ConnectorConfig {
    /// Validate `raw` with every rule for `kind`, then build the typed config
    ///
    /// All validation errors are reported together in
    /// [`ConfigurationError::ValidationFailed`].
    pub fn from_raw(kind: ConnectorKind, raw: &RawConfig) -> ConfigResult<Self> {
        match kind {
            ConnectorKind::Source => SourceConfig::from_raw(raw).map(Self::Source),
            ConnectorKind::Sink => SinkConfig::from_raw(raw).map(Self::Sink),
        }
    }

    pub fn kind(&self) -> ConnectorKind {
        match self {
            Self::Source(_) => ConnectorKind::Source,
            Self::Sink(_) => ConnectorKind::Sink,
        }
    }

    /// Shared connection options of either variant
    pub fn connection(&self) -> &ConnectionConfig {
        match self {
            Self::Source(config) => config.connection(),
            Self::Sink(config) => config.connection(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connector_kind_round_trip() {
        for kind in [ConnectorKind::Source, ConnectorKind::Sink] {
            assert_eq!(kind.to_string().parse::<ConnectorKind>().unwrap(), kind);
        }
        assert!("both".parse::<ConnectorKind>().is_err());
    }

    #[test]
    fn test_schemas_share_connection_options() {
        let source = ConnectorKind::Source.schema().unwrap();
        let sink = ConnectorKind::Sink.schema().unwrap();

        for spec in connection::options() {
            assert!(source.contains(&spec.name), "source missing {}", spec.name);
            assert!(sink.contains(&spec.name), "sink missing {}", spec.name);
        }
        assert!(sink.contains(sink::CHARSET_CONFIG));
        assert!(!source.contains(sink::CHARSET_CONFIG));
    }

    #[test]
    fn test_connector_config_tagged_by_kind() {
        let mut raw = RawConfig::new();
        raw.insert(connection::URI_CONFIG.to_string(), "redis://db:6379".to_string());

        let sink = ConnectorConfig::from_raw(ConnectorKind::Sink, &raw).unwrap();
        assert_eq!(sink.kind(), ConnectorKind::Sink);
        assert_eq!(sink.connection().uri(), "redis://db:6379");

        // stream reader without a stream name
        let error = ConnectorConfig::from_raw(ConnectorKind::Source, &raw).unwrap_err();
        assert!(matches!(error, ConfigurationError::ValidationFailed { ref errors } if errors.len() == 1));
    }
}
