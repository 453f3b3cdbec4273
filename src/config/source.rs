//! # Source Connector Configuration
//!
//! Option declarations, cross-field rules and the typed [`SourceConfig`] for
//! the connector that reads from Redis, either by scanning key patterns
//! ([`ReaderType::Keys`]) or by consuming a stream ([`ReaderType::Stream`]).

use super::connection::{self, ConnectionConfig};
use super::error::{ConfigResult, ConfigurationError};
use super::schema::{Importance, OptionKind, OptionSchema, OptionSpec, OptionValidator};
use super::validator::{ConfigValidator, ValidationResult};
use super::RawConfig;
use crate::constants::{TOKEN_STREAM, TOKEN_TASK, WORK_UNIT_SEPARATOR};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const READER_CONFIG: &str = "redis.reader";
pub const READER_DEFAULT: ReaderType = ReaderType::Stream;

pub const KEY_PATTERNS_CONFIG: &str = "redis.keys.patterns";
pub const KEY_PATTERNS_DEFAULT: &str = "*";
pub const KEY_PATTERNS_DOC: &str = "Comma-separated key patterns to read when the reader is KEYS. Patterns are distributed across tasks.";

pub const STREAM_NAME_CONFIG: &str = "redis.stream.name";
pub const STREAM_NAME_DEFAULT: &str = "";
pub const STREAM_NAME_DOC: &str = "Name of the Redis stream to read from. Required when the reader is STREAM.";

pub const STREAM_OFFSET_CONFIG: &str = "redis.stream.offset";
pub const STREAM_OFFSET_DEFAULT: &str = "0-0";
pub const STREAM_OFFSET_DOC: &str = "Stream offset to start reading from.";

pub const STREAM_BLOCK_CONFIG: &str = "redis.stream.block";
pub const STREAM_BLOCK_DEFAULT: &str = "100";
pub const STREAM_BLOCK_DOC: &str = "The max amount of time in milliseconds to wait while polling for stream messages (XREAD [BLOCK milliseconds]).";

pub const CONSUMER_GROUP_CONFIG: &str = "redis.stream.consumer.group";
pub const CONSUMER_GROUP_DEFAULT: &str = "kafka-consumer-group";
pub const CONSUMER_GROUP_DOC: &str = "Stream consumer group.";

pub const CONSUMER_NAME_CONFIG: &str = "redis.stream.consumer.name";
pub const CONSUMER_NAME_DEFAULT: &str = "consumer-${task}";

pub const DELIVERY_CONFIG: &str = "redis.stream.delivery";
pub const DELIVERY_DEFAULT: StreamDelivery = StreamDelivery::AtLeastOnce;

pub const BATCH_SIZE_CONFIG: &str = "batch.size";
pub const BATCH_SIZE_DEFAULT: &str = "500";
pub const BATCH_SIZE_DOC: &str = "Maximum number of records to include in a single read when polling for new data.";

pub const TOPIC_CONFIG: &str = "topic";
pub const TOPIC_DEFAULT: &str = "redis";

/// How the source reads from Redis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReaderType {
    /// Consume a single stream; tasks share it through a consumer group
    Stream,
    /// Scan keys matching a set of patterns; patterns are split across tasks
    Keys,
}

impl ReaderType {
    pub const NAMES: &'static [&'static str] = &["STREAM", "KEYS"];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Stream => "STREAM",
            Self::Keys => "KEYS",
        }
    }
}

impl fmt::Display for ReaderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ReaderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STREAM" => Ok(Self::Stream),
            "KEYS" => Ok(Self::Keys),
            _ => Err(format!("Invalid reader type: {s}")),
        }
    }
}

/// Stream message acknowledgement policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamDelivery {
    AtLeastOnce,
    AtMostOnce,
}

impl StreamDelivery {
    pub const NAMES: &'static [&'static str] = &["AT_LEAST_ONCE", "AT_MOST_ONCE"];

    pub fn name(&self) -> &'static str {
        match self {
            Self::AtLeastOnce => "AT_LEAST_ONCE",
            Self::AtMostOnce => "AT_MOST_ONCE",
        }
    }
}

impl fmt::Display for StreamDelivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for StreamDelivery {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AT_LEAST_ONCE" => Ok(Self::AtLeastOnce),
            "AT_MOST_ONCE" => Ok(Self::AtMostOnce),
            _ => Err(format!("Invalid stream delivery: {s}")),
        }
    }
}

/// Source-specific option declarations
pub fn options() -> Vec<OptionSpec> {
    vec![
        OptionSpec::new(
            READER_CONFIG,
            OptionKind::String,
            READER_DEFAULT.name(),
            Importance::High,
            format!("Source from which to read Redis records: {}", ReaderType::NAMES.join(", ")),
        )
        .with_validator(OptionValidator::OneOf(ReaderType::NAMES)),
        OptionSpec::new(KEY_PATTERNS_CONFIG, OptionKind::String, KEY_PATTERNS_DEFAULT, Importance::Medium, KEY_PATTERNS_DOC),
        OptionSpec::new(STREAM_NAME_CONFIG, OptionKind::String, STREAM_NAME_DEFAULT, Importance::High, STREAM_NAME_DOC),
        OptionSpec::new(STREAM_OFFSET_CONFIG, OptionKind::String, STREAM_OFFSET_DEFAULT, Importance::Medium, STREAM_OFFSET_DOC),
        OptionSpec::new(STREAM_BLOCK_CONFIG, OptionKind::Long, STREAM_BLOCK_DEFAULT, Importance::Low, STREAM_BLOCK_DOC)
            .with_validator(OptionValidator::AtLeast(1)),
        OptionSpec::new(CONSUMER_GROUP_CONFIG, OptionKind::String, CONSUMER_GROUP_DEFAULT, Importance::Medium, CONSUMER_GROUP_DOC),
        OptionSpec::new(
            CONSUMER_NAME_CONFIG,
            OptionKind::String,
            CONSUMER_NAME_DEFAULT,
            Importance::Medium,
            format!("A format string for the stream consumer, which may contain '{TOKEN_TASK}' as a placeholder for the task id."),
        ),
        OptionSpec::new(
            DELIVERY_CONFIG,
            OptionKind::String,
            DELIVERY_DEFAULT.name(),
            Importance::Medium,
            format!("Stream message delivery guarantee, either {}", StreamDelivery::NAMES.join(" or ")),
        )
        .with_validator(OptionValidator::OneOf(StreamDelivery::NAMES)),
        OptionSpec::new(BATCH_SIZE_CONFIG, OptionKind::Long, BATCH_SIZE_DEFAULT, Importance::Low, BATCH_SIZE_DOC)
            .with_validator(OptionValidator::AtLeast(1)),
        OptionSpec::new(
            TOPIC_CONFIG,
            OptionKind::String,
            TOPIC_DEFAULT,
            Importance::Medium,
            format!("Name of the destination topic, which may contain '{TOKEN_STREAM}' as a placeholder for the originating stream name."),
        ),
    ]
}

/// Connection options followed by the source options
pub fn schema() -> ConfigResult<OptionSchema> {
    let mut specs = connection::options();
    specs.extend(options());
    OptionSchema::new(specs)
}

/// Source schema with its cross-field rules
pub fn validator() -> ConfigResult<ConfigValidator> {
    Ok(ConfigValidator::new(schema()?).with_rule(stream_name_rule))
}

fn stream_name_rule(_raw: &RawConfig, result: &mut ValidationResult) {
    let reader = result
        .string(READER_CONFIG)
        .and_then(|name| name.parse::<ReaderType>().ok());

    if reader == Some(ReaderType::Stream) && result.string(STREAM_NAME_CONFIG) == Some("") {
        let error = ConfigurationError::constraint(
            STREAM_NAME_CONFIG,
            "A stream name is required when the reader is STREAM.",
        );
        result.add_error(STREAM_NAME_CONFIG, error.to_string());
    }
}

/// Split a comma-joined pattern list, dropping blanks and repeated patterns
fn split_patterns(joined: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut patterns = Vec::new();
    for pattern in joined.split(WORK_UNIT_SEPARATOR).map(str::trim) {
        if pattern.is_empty() {
            continue;
        }
        if seen.insert(pattern) {
            patterns.push(pattern.to_string());
        } else {
            warn!(pattern = %pattern, "Ignoring repeated key pattern");
        }
    }
    patterns
}

/// Typed, immutable source configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    connection: ConnectionConfig,
    reader: ReaderType,
    key_patterns: Vec<String>,
    stream_name: String,
    stream_offset: String,
    stream_block: Duration,
    consumer_group: String,
    consumer_name: String,
    delivery: StreamDelivery,
    batch_size: u64,
    topic: String,
}

impl SourceConfig {
    /// Validate a raw map with every source rule, then coerce it
    pub fn from_raw(raw: &RawConfig) -> ConfigResult<Self> {
        let validator = validator()?;
        validator.validate_all(raw).ensure_valid()?;
        let parsed = validator.schema().parse(raw)?;

        let reader_name = parsed.get_string(READER_CONFIG)?;
        let reader = reader_name
            .parse::<ReaderType>()
            .map_err(|e| ConfigurationError::parse(READER_CONFIG, reader_name, e))?;

        let delivery_name = parsed.get_string(DELIVERY_CONFIG)?;
        let delivery = delivery_name
            .parse::<StreamDelivery>()
            .map_err(|e| ConfigurationError::parse(DELIVERY_CONFIG, delivery_name, e))?;

        Ok(Self {
            connection: ConnectionConfig::from_parsed(&parsed)?,
            reader,
            key_patterns: split_patterns(parsed.get_string(KEY_PATTERNS_CONFIG)?),
            stream_name: parsed.get_string(STREAM_NAME_CONFIG)?.to_string(),
            stream_offset: parsed.get_string(STREAM_OFFSET_CONFIG)?.to_string(),
            stream_block: Duration::from_millis(connection::non_negative(&parsed, STREAM_BLOCK_CONFIG)?),
            consumer_group: parsed.get_string(CONSUMER_GROUP_CONFIG)?.to_string(),
            consumer_name: parsed.get_string(CONSUMER_NAME_CONFIG)?.to_string(),
            delivery,
            batch_size: connection::non_negative(&parsed, BATCH_SIZE_CONFIG)?,
            topic: parsed.get_string(TOPIC_CONFIG)?.to_string(),
        })
    }

    pub fn connection(&self) -> &ConnectionConfig {
        &self.connection
    }

    pub fn reader(&self) -> ReaderType {
        self.reader
    }

    /// Key patterns in configured order, without blanks or repeats
    pub fn key_patterns(&self) -> &[String] {
        &self.key_patterns
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    pub fn stream_offset(&self) -> &str {
        &self.stream_offset
    }

    pub fn stream_block(&self) -> Duration {
        self.stream_block
    }

    pub fn consumer_group(&self) -> &str {
        &self.consumer_group
    }

    /// Consumer name template; any `${task}` token is kept verbatim
    pub fn consumer_name(&self) -> &str {
        &self.consumer_name
    }

    pub fn delivery(&self) -> StreamDelivery {
        self.delivery
    }

    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}
