//! # Sink Connector Configuration
//!
//! Option declarations, cross-field rules and the typed [`SinkConfig`] for the
//! connector that writes records into Redis.
//!
//! ## Cross-field rules
//!
//! Evaluated in this order, and only once every option passed per-field
//! validation:
//!
//! - `redis.json.path` and `redis.json.path.fixed` may only be supplied with
//!   the `JSONMERGE` command.
//! - `redis.multiexec` may only be enabled for commands that support
//!   multi/exec transactions (see [`RedisCommand::supports_multiexec`]).
//! - `redis.charset` must name a resolvable [`Charset`].

use super::charset::{Charset, DEFAULT_CHARSET};
use super::connection::{self, non_negative, ConnectionConfig, PoolOptions};
use super::error::{ConfigResult, ConfigurationError};
use super::schema::{Importance, OptionKind, OptionSchema, OptionSpec, OptionValidator};
use super::validator::{ConfigValidator, ValidationResult};
use super::RawConfig;
use crate::constants::TOKEN_TOPIC;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const CHARSET_CONFIG: &str = "redis.charset";
pub const CHARSET_DOC: &str = "Character set to encode Redis key and value strings.";

pub const COMMAND_CONFIG: &str = "redis.command";
pub const COMMAND_DEFAULT: RedisCommand = RedisCommand::Xadd;

pub const KEY_CONFIG: &str = "redis.key";
pub const KEY_DEFAULT: &str = TOKEN_TOPIC;

pub const SEPARATOR_CONFIG: &str = "redis.separator";
pub const SEPARATOR_DEFAULT: &str = ":";
pub const SEPARATOR_DOC: &str = "Separator for non-collection destination keys.";

pub const PUSH_DIRECTION_CONFIG: &str = "redis.push.direction";
pub const PUSH_DIRECTION_DEFAULT: PushDirection = PushDirection::Left;

pub const MULTIEXEC_CONFIG: &str = "redis.multiexec";
pub const MULTIEXEC_DEFAULT: &str = "false";
pub const MULTIEXEC_DOC: &str = "Whether to execute Redis commands in multi/exec transactions.";

pub const WAIT_REPLICAS_CONFIG: &str = "redis.wait.replicas";
pub const WAIT_REPLICAS_DEFAULT: &str = "0";
pub const WAIT_REPLICAS_DOC: &str = "Number of replicas to wait for. Use 0 to disable waiting for replicas.";

pub const WAIT_TIMEOUT_CONFIG: &str = "redis.wait.timeout";
pub const WAIT_TIMEOUT_DEFAULT: &str = "1000";
pub const WAIT_TIMEOUT_DOC: &str = "Timeout in millis for WAIT command.";

pub const JSON_PATH_CONFIG: &str = "redis.json.path";
pub const JSON_PATH_DEFAULT: &str = "$";
pub const JSON_PATH_DOC: &str = "The JSON attribute in the record header from which the JSON path is dynamically set.";

pub const FIXED_JSON_PATH_CONFIG: &str = "redis.json.path.fixed";
pub const FIXED_JSON_PATH_DEFAULT: &str = "$";
pub const FIXED_JSON_PATH_DOC: &str = "The fixed JSON path to merge into. Used when the dynamic path is not present.";

pub const KEY_EXPIRE_CONFIG: &str = "redis.set.expire.timeout";
pub const KEY_EXPIRE_DEFAULT: &str = "0";
pub const KEY_EXPIRE_DOC: &str = "Key expiration timeout in millis for SET command. Use 0 to disable expiration.";

/// Write operation applied to each record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedisCommand {
    Hset,
    Jsonset,
    Jsonmerge,
    Tsadd,
    Set,
    Xadd,
    Lpush,
    Rpush,
    Sadd,
    Zadd,
    Del,
}

impl RedisCommand {
    pub const ALL: [RedisCommand; 11] = [
        Self::Hset,
        Self::Jsonset,
        Self::Jsonmerge,
        Self::Tsadd,
        Self::Set,
        Self::Xadd,
        Self::Lpush,
        Self::Rpush,
        Self::Sadd,
        Self::Zadd,
        Self::Del,
    ];

    pub const NAMES: &'static [&'static str] = &[
        "HSET", "JSONSET", "JSONMERGE", "TSADD", "SET", "XADD", "LPUSH", "RPUSH", "SADD", "ZADD",
        "DEL",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Hset => "HSET",
            Self::Jsonset => "JSONSET",
            Self::Jsonmerge => "JSONMERGE",
            Self::Tsadd => "TSADD",
            Self::Set => "SET",
            Self::Xadd => "XADD",
            Self::Lpush => "LPUSH",
            Self::Rpush => "RPUSH",
            Self::Sadd => "SADD",
            Self::Zadd => "ZADD",
            Self::Del => "DEL",
        }
    }

    /// Whether writes with this command can be batched in a multi/exec transaction
    pub fn supports_multiexec(&self) -> bool {
        match self {
            Self::Xadd | Self::Lpush | Self::Rpush | Self::Sadd | Self::Zadd => true,
            Self::Hset
            | Self::Jsonset
            | Self::Jsonmerge
            | Self::Tsadd
            | Self::Set
            | Self::Del => false,
        }
    }

    /// Commands usable with `redis.multiexec`, in declaration order
    pub fn multiexec_commands() -> Vec<RedisCommand> {
        Self::ALL
            .into_iter()
            .filter(RedisCommand::supports_multiexec)
            .collect()
    }
}

impl fmt::Display for RedisCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for RedisCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|command| command.name() == s)
            .ok_or_else(|| format!("Invalid Redis command: {s}"))
    }
}

/// List push direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PushDirection {
    Left,
    Right,
}

impl PushDirection {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
        }
    }
}

impl fmt::Display for PushDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for PushDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LEFT" => Ok(Self::Left),
            "RIGHT" => Ok(Self::Right),
            _ => Err(format!("Invalid push direction: {s}")),
        }
    }
}

/// Block writes until `replicas` replicas acknowledge them, up to `timeout`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitForReplication {
    pub replicas: u32,
    pub timeout: Duration,
}

/// Options the data-plane writer is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterOptions {
    pub pool: PoolOptions,
    pub multi_exec: bool,
    pub wait_for_replication: Option<WaitForReplication>,
}

fn command_doc() -> String {
    format!("Destination data structure: {}", RedisCommand::NAMES.join(","))
}

fn key_doc() -> String {
    format!(
        "A format string for destination key space, which may contain '{TOKEN_TOPIC}' as a placeholder for the originating topic name.\n\
         For example, ``kafka_{TOKEN_TOPIC}`` for the topic 'orders' will map to the Redis key space 'kafka_orders'.\n\
         Leave empty for passthrough (only applicable to non-collection data structures)."
    )
}

fn push_direction_doc() -> String {
    format!(
        "List push direction: {} (LPUSH) or {} (RPUSH)",
        PushDirection::Left,
        PushDirection::Right
    )
}

/// Sink-specific option declarations
pub fn options() -> Vec<OptionSpec> {
    vec![
        OptionSpec::new(CHARSET_CONFIG, OptionKind::String, DEFAULT_CHARSET, Importance::High, CHARSET_DOC),
        OptionSpec::new(COMMAND_CONFIG, OptionKind::String, COMMAND_DEFAULT.name(), Importance::High, command_doc())
            .with_validator(OptionValidator::OneOf(RedisCommand::NAMES)),
        OptionSpec::new(KEY_CONFIG, OptionKind::String, KEY_DEFAULT, Importance::Medium, key_doc()),
        OptionSpec::new(SEPARATOR_CONFIG, OptionKind::String, SEPARATOR_DEFAULT, Importance::Medium, SEPARATOR_DOC),
        OptionSpec::new(
            PUSH_DIRECTION_CONFIG,
            OptionKind::String,
            PUSH_DIRECTION_DEFAULT.name(),
            Importance::Medium,
            push_direction_doc(),
        ),
        OptionSpec::new(MULTIEXEC_CONFIG, OptionKind::Boolean, MULTIEXEC_DEFAULT, Importance::Medium, MULTIEXEC_DOC),
        OptionSpec::new(WAIT_REPLICAS_CONFIG, OptionKind::Int, WAIT_REPLICAS_DEFAULT, Importance::Medium, WAIT_REPLICAS_DOC)
            .with_validator(OptionValidator::AtLeast(0)),
        OptionSpec::new(WAIT_TIMEOUT_CONFIG, OptionKind::Long, WAIT_TIMEOUT_DEFAULT, Importance::Medium, WAIT_TIMEOUT_DOC)
            .with_validator(OptionValidator::AtLeast(0)),
        OptionSpec::new(JSON_PATH_CONFIG, OptionKind::String, JSON_PATH_DEFAULT, Importance::Medium, JSON_PATH_DOC),
        OptionSpec::new(
            FIXED_JSON_PATH_CONFIG,
            OptionKind::String,
            FIXED_JSON_PATH_DEFAULT,
            Importance::Medium,
            FIXED_JSON_PATH_DOC,
        ),
        OptionSpec::new(KEY_EXPIRE_CONFIG, OptionKind::Long, KEY_EXPIRE_DEFAULT, Importance::Medium, KEY_EXPIRE_DOC)
            .with_validator(OptionValidator::AtLeast(0)),
    ]
}

/// Connection options followed by the sink options
pub fn schema() -> ConfigResult<OptionSchema> {
    let mut specs = connection::options();
    specs.extend(options());
    OptionSchema::new(specs)
}

/// Sink schema with its cross-field rules
pub fn validator() -> ConfigResult<ConfigValidator> {
    Ok(ConfigValidator::new(schema()?)
        .with_rule(json_path_rule)
        .with_rule(multiexec_rule)
        .with_rule(charset_rule))
}

fn add_constraint(result: &mut ValidationResult, option: &str, reason: impl Into<String>) {
    result.add_error(option, ConfigurationError::constraint(option, reason).to_string());
}

fn validated_command(result: &ValidationResult) -> Option<RedisCommand> {
    result.string(COMMAND_CONFIG)?.parse().ok()
}

fn json_path_rule(raw: &RawConfig, result: &mut ValidationResult) {
    let Some(command) = validated_command(result) else {
        return;
    };
    if command == RedisCommand::Jsonmerge {
        return;
    }

    if raw.contains_key(JSON_PATH_CONFIG) {
        add_constraint(
            result,
            JSON_PATH_CONFIG,
            "The JSON path configuration is not allowed unless the command is JSONMERGE.",
        );
    }
    if raw.contains_key(FIXED_JSON_PATH_CONFIG) {
        add_constraint(
            result,
            FIXED_JSON_PATH_CONFIG,
            "The fixed JSON path configuration is not allowed unless the command is JSONMERGE.",
        );
    }
}

fn multiexec_rule(_raw: &RawConfig, result: &mut ValidationResult) {
    let Some(command) = validated_command(result) else {
        return;
    };

    if result.boolean(MULTIEXEC_CONFIG) == Some(true) && !command.supports_multiexec() {
        let supported: Vec<&str> = RedisCommand::multiexec_commands()
            .iter()
            .map(RedisCommand::name)
            .collect();
        add_constraint(
            result,
            MULTIEXEC_CONFIG,
            format!(
                "multi/exec is only supported with these data structures: {}",
                supported.join(", ")
            ),
        );
    }
}

fn charset_rule(_raw: &RawConfig, result: &mut ValidationResult) {
    let Some(name) = result.string(CHARSET_CONFIG) else {
        return;
    };

    if let Err(error) = Charset::for_name(name) {
        add_constraint(result, CHARSET_CONFIG, error.to_string());
    }
}

/// Typed, immutable sink configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    connection: ConnectionConfig,
    charset: Charset,
    command: RedisCommand,
    keyspace: String,
    separator: String,
    push_direction: PushDirection,
    multiexec: bool,
    wait_replicas: u32,
    wait_timeout: Duration,
    json_path: String,
    fixed_json_path: String,
    key_expire_timeout: Duration,
}

impl SinkConfig {
    /// Validate a raw map with every sink rule, then coerce it
    ///
    /// Validation errors are reported together in
    /// [`ConfigurationError::ValidationFailed`]. A push direction has no
    /// per-field check and fails here on coercion instead.
    pub fn from_raw(raw: &RawConfig) -> ConfigResult<Self> {
        let validator = validator()?;
        validator.validate_all(raw).ensure_valid()?;
        let parsed = validator.schema().parse(raw)?;

        let charset_name = parsed.get_string(CHARSET_CONFIG)?;
        let charset = Charset::for_name(charset_name)
            .map_err(|e| ConfigurationError::parse(CHARSET_CONFIG, charset_name, e.to_string()))?;

        let command_name = parsed.get_string(COMMAND_CONFIG)?;
        let command = command_name
            .parse::<RedisCommand>()
            .map_err(|e: String| ConfigurationError::parse(COMMAND_CONFIG, command_name, e))?;

        let direction_name = parsed.get_string(PUSH_DIRECTION_CONFIG)?;
        let push_direction = direction_name
            .parse::<PushDirection>()
            .map_err(|e: String| ConfigurationError::parse(PUSH_DIRECTION_CONFIG, direction_name, e))?;

        let replicas = parsed.get_int(WAIT_REPLICAS_CONFIG)?;
        let wait_replicas = u32::try_from(replicas).map_err(|_| {
            ConfigurationError::parse(WAIT_REPLICAS_CONFIG, replicas.to_string(), "Value must be at least 0")
        })?;

        Ok(Self {
            connection: ConnectionConfig::from_parsed(&parsed)?,
            charset,
            command,
            keyspace: parsed.get_string(KEY_CONFIG)?.to_string(),
            separator: parsed.get_string(SEPARATOR_CONFIG)?.to_string(),
            push_direction,
            multiexec: parsed.get_bool(MULTIEXEC_CONFIG)?,
            wait_replicas,
            wait_timeout: Duration::from_millis(non_negative(&parsed, WAIT_TIMEOUT_CONFIG)?),
            json_path: parsed.get_string(JSON_PATH_CONFIG)?.to_string(),
            fixed_json_path: parsed.get_string(FIXED_JSON_PATH_CONFIG)?.to_string(),
            key_expire_timeout: Duration::from_millis(non_negative(&parsed, KEY_EXPIRE_CONFIG)?),
        })
    }

    pub fn connection(&self) -> &ConnectionConfig {
        &self.connection
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    pub fn command(&self) -> RedisCommand {
        self.command
    }

    /// Key space template; any `${topic}` token is kept verbatim
    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn push_direction(&self) -> PushDirection {
        self.push_direction
    }

    pub fn is_multiexec(&self) -> bool {
        self.multiexec
    }

    pub fn wait_replicas(&self) -> u32 {
        self.wait_replicas
    }

    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }

    pub fn json_path(&self) -> &str {
        &self.json_path
    }

    pub fn fixed_json_path(&self) -> &str {
        &self.fixed_json_path
    }

    pub fn key_expire_timeout(&self) -> Duration {
        self.key_expire_timeout
    }

    /// Replication wait directive, present only when `wait_replicas > 0`
    pub fn wait_for_replication(&self) -> Option<WaitForReplication> {
        (self.wait_replicas > 0).then_some(WaitForReplication {
            replicas: self.wait_replicas,
            timeout: self.wait_timeout,
        })
    }

    pub fn writer_options(&self) -> WriterOptions {
        WriterOptions {
            pool: self.connection.pool_options(),
            multi_exec: self.multiexec,
            wait_for_replication: self.wait_for_replication(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> RawConfig {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_command_names_match_variants() {
        assert_eq!(RedisCommand::NAMES.len(), RedisCommand::ALL.len());
        for (command, name) in RedisCommand::ALL.iter().zip(RedisCommand::NAMES) {
            assert_eq!(command.name(), *name);
            assert_eq!(name.parse::<RedisCommand>().unwrap(), *command);
        }
        assert!("xadd".parse::<RedisCommand>().is_err());
    }

    #[test]
    fn test_multiexec_commands() {
        assert_eq!(
            RedisCommand::multiexec_commands(),
            vec![
                RedisCommand::Xadd,
                RedisCommand::Lpush,
                RedisCommand::Rpush,
                RedisCommand::Sadd,
                RedisCommand::Zadd
            ]
        );
    }

    #[test]
    fn test_defaults() {
        let config = SinkConfig::from_raw(&RawConfig::new()).unwrap();

        assert_eq!(config.charset(), Charset::Utf8);
        assert_eq!(config.command(), RedisCommand::Xadd);
        assert_eq!(config.keyspace(), "${topic}");
        assert_eq!(config.separator(), ":");
        assert_eq!(config.push_direction(), PushDirection::Left);
        assert!(!config.is_multiexec());
        assert_eq!(config.wait_timeout(), Duration::from_millis(1000));
        assert_eq!(config.json_path(), "$");
        assert_eq!(config.key_expire_timeout(), Duration::ZERO);
        assert_eq!(config.wait_for_replication(), None);
    }

    #[test]
    fn test_bad_push_direction_fails_typed_construction_only() {
        let raw = raw(&[(PUSH_DIRECTION_CONFIG, "UP")]);

        assert!(!validator().unwrap().validate_all(&raw).has_errors());
        assert_eq!(
            SinkConfig::from_raw(&raw).unwrap_err(),
            ConfigurationError::parse(PUSH_DIRECTION_CONFIG, "UP", "Invalid push direction: UP")
        );
    }

    #[test]
    fn test_unresolvable_charset_fails_typed_construction() {
        let error = SinkConfig::from_raw(&raw(&[(CHARSET_CONFIG, "not-a-charset")])).unwrap_err();
        assert!(matches!(
            error,
            ConfigurationError::ValidationFailed { ref errors }
                if errors.len() == 1 && errors[0].contains("Unsupported charset: not-a-charset")
        ));
    }

    #[test]
    fn test_cross_field_violations_fail_typed_construction() {
        let error = SinkConfig::from_raw(&raw(&[
            (COMMAND_CONFIG, "HSET"),
            (MULTIEXEC_CONFIG, "true"),
            (JSON_PATH_CONFIG, "$.a"),
        ]))
        .unwrap_err();

        let ConfigurationError::ValidationFailed { errors } = error else {
            panic!("expected a validation failure, got {error:?}");
        };
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with(JSON_PATH_CONFIG));
        assert!(errors[1].starts_with(MULTIEXEC_CONFIG));
    }

    #[test]
    fn test_writer_options() {
        let config = SinkConfig::from_raw(&raw(&[
            (MULTIEXEC_CONFIG, "true"),
            (WAIT_REPLICAS_CONFIG, "1"),
            (connection::POOL_MAX_CONFIG, "4"),
        ]))
        .unwrap();

        let options = config.writer_options();
        assert!(options.multi_exec);
        assert_eq!(options.pool.max_total, 4);
        assert_eq!(
            options.wait_for_replication,
            Some(WaitForReplication {
                replicas: 1,
                timeout: Duration::from_millis(1000)
            })
        );
    }

    #[test]
    fn test_documentation_mentions_topic_token() {
        let schema = schema().unwrap();
        let key = schema.get(KEY_CONFIG).unwrap();
        assert!(key.doc.contains(TOKEN_TOPIC));
        assert_eq!(key.default.as_deref(), Some(TOKEN_TOPIC));
    }
}
